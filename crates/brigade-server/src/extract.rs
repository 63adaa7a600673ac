//! Request extractors for bearer-token authentication.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use brigade_auth::Identity;
use brigade_core::context::AppContext;
use brigade_core::error::BrigadeError;

use crate::error::ApiError;
use crate::state::AppState;

/// Any authenticated caller, with or without an organization scope.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Identity);

/// A caller whose token is scoped to an organization they are still a
/// member of, carrying their stored role.
#[derive(Debug, Clone, Copy)]
pub struct OrgContext(pub AppContext);

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            ApiError(BrigadeError::AuthenticationFailed {
                reason: "missing bearer token".into(),
            })
        })?;
        Ok(Caller(state.auth.authenticate(token)?))
    }
}

impl FromRequestParts<AppState> for OrgContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Caller(identity) = Caller::from_request_parts(parts, state).await?;
        Ok(OrgContext(state.auth.authorize(&identity).await?))
    }
}
