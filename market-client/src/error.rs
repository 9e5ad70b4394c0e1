//! Client error types

use shared::ErrorCode;
use thiserror::Error;

use crate::draft::DraftError;
use crate::storage::StorageError;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Backend rejected the call (`success: false` or an error status)
    #[error("API error ({code:?}): {message}")]
    Api { code: ErrorCode, message: String },

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Realtime connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Operation timed out
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Persisted state could not be read or written
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Draft failed validation before submission
    #[error(transparent)]
    Draft(#[from] DraftError),
}

impl ClientError {
    /// Build from an HTTP status and body text
    pub fn from_status(status: reqwest::StatusCode, text: String) -> Self {
        match ErrorCode::from_status(status) {
            ErrorCode::Unauthorized => ClientError::Unauthorized,
            ErrorCode::Forbidden => ClientError::Forbidden(text),
            ErrorCode::NotFound => ClientError::NotFound(text),
            ErrorCode::Validation => ClientError::Validation(text),
            code => ClientError::Api {
                code,
                message: if text.is_empty() {
                    code.default_message().to_string()
                } else {
                    text
                },
            },
        }
    }

    /// Whether the session token should be dropped
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthorized
                | ClientError::Api {
                    code: ErrorCode::Unauthorized,
                    ..
                }
        )
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
