//! # Domain Entities Module
//!
//! MongoDB에 저장되는 문서 모델입니다. 관계는 임베딩 없이 ObjectId 참조로만 표현하고,
//! 조회 시 [`entity::Population`] 규칙으로 채워 넣습니다.

pub mod entity;
pub mod users;
pub mod tours;
pub mod reviews;
pub mod bookings;

pub use entity::{Entity, Population};
pub use users::*;
pub use tours::*;
pub use reviews::*;
pub use bookings::*;
