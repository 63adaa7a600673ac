//! Token signing keys and password policy.

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Ed25519 signing key, PKCS#8 PEM.
    pub jwt_private_key_pem: String,
    /// Ed25519 verification key, SPKI PEM.
    pub jwt_public_key_pem: String,
    /// How long an access token stays valid. There are no refresh
    /// tokens; clients log in again.
    pub access_token_lifetime_secs: u64,
    /// Written to and required in the `iss` claim.
    pub jwt_issuer: String,
    /// Server-side secret prepended to passwords. The user store must
    /// hash with the same value.
    pub pepper: Option<String>,
    /// Shortest password accepted at registration, in characters.
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_private_key_pem: String::new(),
            jwt_public_key_pem: String::new(),
            access_token_lifetime_secs: 900,
            jwt_issuer: "brigade".into(),
            pepper: None,
            min_password_length: 12,
        }
    }
}
