//! 요청/응답 DTO
//!
//! 요청 DTO 는 `validator`로 형식을 검증하고, 엔티티 또는 `$set` 문서로 변환됩니다.

pub mod common;
pub mod users;
pub mod tours;
pub mod reviews;
pub mod bookings;

pub use common::*;
