//! Error types for the registry and the upload coordinator.

use api_client::ApiError;
use std::path::PathBuf;
use thiserror::Error;

/// Shown when the server gives no reason for a failed upload.
pub const UPLOAD_FALLBACK_MESSAGE: &str = "Failed to process file";

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Failed to fetch data sources: {0}")]
    Api(#[from] ApiError),

    /// The registry was closed; no state was changed.
    #[error("Registry closed")]
    Cancelled,
}

impl RegistryError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, RegistryError::Api(e) if e.is_unauthorized())
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Error, Debug)]
pub enum UploadError {
    /// Rejected locally; nothing was sent.
    #[error("{0}")]
    Validation(String),

    /// Another upload is in flight.
    #[error("An upload is already in progress")]
    Busy,

    #[error("Upload failed: {0}")]
    Api(#[from] ApiError),

    #[error("Upload cancelled")]
    Cancelled,

    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UploadError {
    /// Text for the user notification: the server's reason when it sent
    /// one, otherwise a generic failure message.
    pub fn user_message(&self) -> String {
        match self {
            UploadError::Api(e) => e.user_message(UPLOAD_FALLBACK_MESSAGE),
            other => other.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, UploadError::Validation(_))
    }
}

pub type UploadResult<T> = Result<T, UploadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_message_falls_back_to_generic() {
        assert_eq!(
            UploadError::Api(ApiError::Timeout).user_message(),
            UPLOAD_FALLBACK_MESSAGE
        );
    }

    #[test]
    fn test_validation_message_is_verbatim() {
        let err = UploadError::Validation("Please select a CSV file".to_string());
        assert!(err.is_validation());
        assert_eq!(err.user_message(), "Please select a CSV file");
    }

    #[test]
    fn test_registry_unauthorized() {
        let err = RegistryError::from(ApiError::Unauthorized(String::new()));
        assert!(err.is_unauthorized());
        assert!(!RegistryError::Cancelled.is_unauthorized());
    }
}
