//! HTTP 미들웨어
//!
//! - [`AuthMiddleware`] - 세션 토큰 검증과 역할 제한
//! - [`RateLimitEnvelope`] - 요청 제한(429) 응답을 표준 에러 봉투로 변환

pub mod auth_middleware;
mod auth_inner;
pub mod rate_limit;

pub use auth_middleware::AuthMiddleware;
pub use rate_limit::RateLimitEnvelope;
