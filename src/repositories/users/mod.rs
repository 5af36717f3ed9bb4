//! 사용자 리포지토리
//!
//! 로그인, 비밀번호 재설정, 소프트 삭제에 필요한 조회와 갱신을 제공합니다.

pub mod user_repo;

pub use user_repo::UserRepository;
