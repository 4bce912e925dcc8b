//! Error types for cal-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// cal-api error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Core error: {0}")]
    Core(#[from] cal_core::Error),
}

impl IntoResponse for ApiError {
    /// Map to the wire contract: bad request shape is user-correctable and
    /// echoes its reason; everything else is logged and collapsed into one
    /// generic internal-error body.
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            other => {
                error!("Request failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "An internal server error occurred." })),
                )
                    .into_response()
            }
        }
    }
}

/// Result type alias for cal-api
pub type Result<T> = std::result::Result<T, ApiError>;
