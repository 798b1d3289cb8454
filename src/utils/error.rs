//! Error Handling
//!
//! Unified error types for the viewer application.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP/network errors talking to the backend engine
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status from the backend engine
    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    /// Run submission rejected or response unusable (e.g. missing run id)
    #[error("Submission error: {0}")]
    Submission(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Event stream transport errors
    #[error("Stream error: {0}")]
    Stream(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a submission error
    pub fn submission(msg: impl Into<String>) -> Self {
        Self::Submission(msg.into())
    }

    /// Create a stream error
    pub fn stream(msg: impl Into<String>) -> Self {
        Self::Stream(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            AppError::Network(format!("Connection failed: {}", err))
        } else if err.is_timeout() {
            AppError::Network(format!("Request timed out: {}", err))
        } else {
            AppError::Network(err.to_string())
        }
    }
}

/// Convert AppError to a string for presentation layers
impl From<AppError> for String {
    fn from(err: AppError) -> String {
        err.to_string()
    }
}
