//! Password checks: Argon2id verification and the registration policy.

use std::borrow::Cow;

use argon2::password_hash::{Error as HashError, PasswordHash};
use argon2::{Argon2, PasswordVerifier};

use crate::error::AuthError;

fn with_pepper<'a>(password: &'a str, pepper: Option<&str>) -> Cow<'a, str> {
    match pepper {
        Some(pepper) => Cow::Owned(format!("{pepper}{password}")),
        None => Cow::Borrowed(password),
    }
}

/// Check `password` against a stored PHC string. The pepper, when set,
/// is prepended exactly as the user store does when hashing.
///
/// A malformed stored hash is a [`AuthError::Crypto`] error, not a
/// mismatch.
pub fn verify_password(
    password: &str,
    stored_hash: &str,
    pepper: Option<&str>,
) -> Result<bool, AuthError> {
    let stored = PasswordHash::new(stored_hash)
        .map_err(|e| AuthError::Crypto(format!("stored password hash is malformed: {e}")))?;

    // Argon2 parameters come from the PHC string itself.
    let candidate = with_pepper(password, pepper);
    match Argon2::default().verify_password(candidate.as_bytes(), &stored) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("password verification failed: {e}"))),
    }
}

/// Reject passwords shorter than `min_length` characters.
pub fn check_policy(password: &str, min_length: usize) -> Result<(), AuthError> {
    if password.chars().count() < min_length {
        return Err(AuthError::WeakPassword { min: min_length });
    }
    Ok(())
}
