pub mod response;
pub mod update;

pub use response::ApiResponse;
pub use update::{IntoUpdate, UpdateDocument};
