pub mod entities;
pub mod dto;
pub mod models;

pub use entities::*;
