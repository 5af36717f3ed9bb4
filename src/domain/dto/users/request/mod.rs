pub mod auth_request;
pub mod update_user;

pub use auth_request::{ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, SignupRequest, UpdatePasswordRequest};
pub use update_user::{UpdateMeRequest, UpdateUserRequest};
