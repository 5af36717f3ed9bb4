//! # Core
//!
//! - [`registry`] - `ServiceLocator` 싱글톤 컨테이너와 `Repository` 초기화 트레이트
//! - [`errors`] - `AppError`, `AppResult`, 에러 → HTTP 응답 변환

pub mod errors;
pub mod registry;

pub use errors::*;
pub use registry::*;
