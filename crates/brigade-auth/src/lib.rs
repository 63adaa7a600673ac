//! Brigade Auth — password verification, access-token issuance and
//! validation, and the register/login flow.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{AuthService, Identity, LoginInput, LoginOutput, RegisterInput};
pub use token::AccessTokenClaims;
