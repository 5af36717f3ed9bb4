//! Tours Entity Module

pub mod tour;

pub use tour::{Difficulty, GeoLocation, Tour, DEFAULT_RATING};
