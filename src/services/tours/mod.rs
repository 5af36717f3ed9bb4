//! 투어 통계와 지리 검색

pub mod tour_service;

pub use tour_service::{DistanceUnit, TourService};
