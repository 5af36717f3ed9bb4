pub mod request;

pub use request::{CreateBookingRequest, UpdateBookingRequest};
