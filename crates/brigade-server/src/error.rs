//! Mapping of domain errors onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use brigade_core::error::BrigadeError;
use serde_json::json;
use tracing::error;

/// A [`BrigadeError`] rendered as `{"error": "..."}` with a matching
/// status code.
#[derive(Debug)]
pub struct ApiError(pub BrigadeError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<BrigadeError> for ApiError {
    fn from(err: BrigadeError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BrigadeError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            BrigadeError::NotFound { .. } => StatusCode::NOT_FOUND,
            BrigadeError::AlreadyExists { .. } => StatusCode::CONFLICT,
            BrigadeError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            BrigadeError::AuthorizationDenied { .. } => StatusCode::FORBIDDEN,
            BrigadeError::Database(_) | BrigadeError::Crypto(_) | BrigadeError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Backend details stay in the logs.
        let message = if status.is_server_error() {
            error!(error = %self.0, "Request failed");
            "internal server error".to_string()
        } else {
            self.0.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
