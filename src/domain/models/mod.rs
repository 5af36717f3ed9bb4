//! 저장되지 않는 도메인 모델: 인증 컨텍스트, 토큰, 쿼리 조합기

pub mod auth;
pub mod token;
pub mod query;
