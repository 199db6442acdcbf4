//! Dashboard error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use arena_field::FieldError;

/// Failure opening a viewer session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Transport failed: {0}")]
    Transport(String),
}

/// Error returned by request/response handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Field(FieldError::PhaseViolation { .. }) => {
                (StatusCode::BAD_REQUEST, "Arena must be in pre-match state").into_response()
            }
            Self::Internal(message) => {
                error!(error = %message, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
