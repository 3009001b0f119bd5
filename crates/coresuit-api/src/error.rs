//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use coresuit_core::error::{AppError, ErrorKind};

/// Uniform error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Whether the failure is a recognized business error whose messages
    /// are meant for the client.
    pub is_custom_exception: bool,
    /// Human-readable messages.
    pub messages: Vec<String>,
    /// Error category.
    pub error_type: String,
}

/// An [`AppError`] on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

/// Status code and custom-exception flag for an error kind.
///
/// Validation is 400 but the other client errors are 403.
pub fn classify(kind: ErrorKind) -> (StatusCode, bool) {
    match kind {
        ErrorKind::NotFound | ErrorKind::Lifecycle => (StatusCode::NOT_FOUND, false),
        ErrorKind::Validation => (StatusCode::BAD_REQUEST, true),
        ErrorKind::InvalidOperation => (StatusCode::FORBIDDEN, true),
        ErrorKind::Unauthorized | ErrorKind::InvalidArgument => (StatusCode::FORBIDDEN, false),
        ErrorKind::Database
        | ErrorKind::ServiceUnavailable
        | ErrorKind::Configuration
        | ErrorKind::Serialization
        | ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, false),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let (status, is_custom_exception) = classify(err.kind);

        let message = if status.is_server_error() {
            let chain = err.message_chain();
            tracing::error!(kind = %err.kind, error = %chain, "Unexpected error");
            chain
        } else {
            tracing::warn!(kind = %err.kind, error = %err.message, "Request failed");
            err.message
        };

        let body = ErrorResponse {
            is_custom_exception,
            messages: vec![message],
            error_type: err.kind.label().to_string(),
        };

        (status, Json(body)).into_response()
    }
}
