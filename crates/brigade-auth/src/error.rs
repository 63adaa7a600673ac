//! Authentication error types.

use brigade_core::error::BrigadeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is inactive")]
    AccountInactive,

    #[error("account is pending verification")]
    AccountPendingVerification,

    #[error("user is not a member of this organization")]
    NotAMember,

    #[error("token is not scoped to an organization")]
    NoOrganization,

    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("invalid email address")]
    InvalidEmail,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for BrigadeError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::AccountInactive
            | AuthError::AccountPendingVerification
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_) => BrigadeError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::NotAMember | AuthError::NoOrganization => {
                BrigadeError::denied(err.to_string())
            }
            AuthError::WeakPassword { .. } | AuthError::InvalidEmail => {
                BrigadeError::validation(err.to_string())
            }
            AuthError::Crypto(msg) => BrigadeError::Crypto(msg),
        }
    }
}
