//! Reviews Entity Module

pub mod review;

pub use review::Review;
