//! # Configuration Module
//!
//! 환경 변수 기반 설정값을 한곳에서 관리합니다.
//! `.env.dev` / `.env.prod` 파일은 `main`에서 `PROFILE`에 따라 로드됩니다.
//!
//! - [`data_config`] - 실행 환경, 서버, 요청 제한, 업로드 경로, bcrypt 비용
//! - [`auth_config`] - JWT, 세션 쿠키, 재설정 토큰, 메일 API
//!
//! ```rust,ignore
//! use crate::config::{Environment, JwtConfig};
//!
//! if Environment::current().is_production() {
//!     // Secure 쿠키 사용
//! }
//! let ttl = JwtConfig::expires_in_secs();
//! ```

pub mod data_config;
pub mod auth_config;

pub use data_config::*;
pub use auth_config::*;
