pub mod request;

pub use request::{CreateReviewRequest, UpdateReviewRequest};
