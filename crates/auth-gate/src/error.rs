//! Gate error types.

use api_client::ApiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// A required form field was missing; nothing was sent.
    #[error("{0}")]
    Validation(String),

    /// The service rejected or failed the call
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Reading or writing the credential failed
    #[error("Storage error: {0}")]
    Storage(#[from] session_store::StorageError),

    /// Invalid state transition in the gate FSM
    #[error("Invalid gate state transition: {0}")]
    InvalidStateTransition(String),
}

impl AuthError {
    /// Message to show the user, falling back to `fallback` when the server
    /// sent no detail.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AuthError::Validation(message) => message.clone(),
            AuthError::Api(e) => e.user_message(fallback),
            _ => fallback.to_string(),
        }
    }
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_shown_verbatim() {
        let err = AuthError::Validation("Email is required".to_string());
        assert_eq!(err.user_message("Login failed"), "Email is required");
        assert_eq!(err.to_string(), "Email is required");
    }

    #[test]
    fn test_api_message_uses_detail() {
        let err = AuthError::from(ApiError::Unauthorized("Email ou senha incorretos".to_string()));
        assert_eq!(err.user_message("Login failed"), "Email ou senha incorretos");

        let err = AuthError::from(ApiError::Timeout);
        assert_eq!(err.user_message("Login failed"), "Login failed");
    }
}
