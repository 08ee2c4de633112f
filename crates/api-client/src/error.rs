//! API error types.

use reqwest::StatusCode;
use thiserror::Error;

/// Error type for calls to the analytics service.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport failure (connect, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// The service rejected the credential (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-success status
    #[error("Server returned {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Server {
        status: StatusCode,
        message: Option<String>,
    },

    /// Response body did not match the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Bad base URL or client construction failure
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading the credential failed
    #[error("Storage error: {0}")]
    Storage(#[from] session_store::StorageError),
}

impl ApiError {
    /// Classify a reqwest error, folding timeouts into [`ApiError::Timeout`].
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Http(err)
        }
    }

    /// Message meant for the user: the server's `detail` when it sent one,
    /// otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Server {
                message: Some(message),
                ..
            } => message.clone(),
            ApiError::Unauthorized(message) if !message.is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}

/// Result type alias using ApiError.
pub type ApiResult<T> = Result<T, ApiError>;
