//! 인증 관련 서비스
//!
//! - [`TokenService`] - HS256 세션 토큰 발급/검증
//! - [`PasswordService`] - bcrypt 해싱, 재설정 토큰
//! - [`AuthService`] - 가입, 로그인, 세션 검증, 비밀번호 재설정/변경 흐름

pub mod token_service;
pub mod password_service;
pub mod auth_service;

pub use token_service::TokenService;
pub use password_service::{hash_reset_token, PasswordService};
pub use auth_service::{AuthService, SignedIn};
