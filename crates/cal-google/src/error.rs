//! Error types for cal-google

use thiserror::Error;

/// cal-google error type
#[derive(Error, Debug)]
pub enum GoogleError {
    #[error("Timestamp parse error: {0}")]
    ParseTimestamp(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Token store error: {0}")]
    TokenStore(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, GoogleError>;
