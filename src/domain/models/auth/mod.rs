pub mod authenticated_user;
pub mod authentication_request;

pub use authenticated_user::{AuthenticatedUser, OptionalUser};
pub use authentication_request::{AuthFailure, AuthMode, RequiredRole};
