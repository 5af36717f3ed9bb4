pub mod token;

pub use token::{ResetToken, TokenClaims, VerifiedSession};
