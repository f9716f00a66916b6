//! HTTP error mapping for API handlers.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use murmur_conversation::ServiceError;

/// An API-level error: an HTTP status plus a human-readable message.
///
/// Service errors pass their message through to the caller; nothing is
/// retried here.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Creates a 400 validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = match &err {
            ServiceError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ServiceError::Validation { .. } => StatusCode::BAD_REQUEST,
            ServiceError::AccessDenied { .. } => StatusCode::FORBIDDEN,
            ServiceError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::GenerationFailed { .. } => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}
