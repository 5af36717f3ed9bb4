//! 사용자 자기 관리 및 관리자 수정 서비스

pub mod user_service;

pub use user_service::UserService;
