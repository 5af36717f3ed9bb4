pub mod request;

pub use request::{CreateTourRequest, UpdateTourRequest};
