//! 캐싱 계층 모듈
//!
//! ```rust,ignore
//! use crate::caching::redis::RedisClient;
//!
//! let cache = RedisClient::new().await?;
//! cache.set_with_expiry("user:64b0...", &user, 600).await?;
//! let cached: Option<User> = cache.get("user:64b0...").await?;
//! cache.del("user:64b0...").await?;
//! ```
//!
//! ```bash
//! REDIS_URL=redis://localhost:6379  # 기본값
//! ```

pub mod redis;
