//! 공통 유틸리티
//!
//! - [`string_utils`] - ObjectId 파싱, 슬러그, 반올림, 빈 문자열 역직렬화
//! - [`bson_json`] - BSON 문서 ↔ API 응답 JSON 변환
//! - [`display_terminal`] - 시작 로그 포맷팅
//!
//! ```rust,ignore
//! use crate::utils::string_utils::{parse_object_id, slugify};
//!
//! let id = parse_object_id("5c88fa8cf4afda39709c2955")?;
//! assert_eq!(slugify("The Forest Hiker"), "the-forest-hiker");
//! ```

pub mod string_utils;
pub mod bson_json;
pub mod display_terminal;
