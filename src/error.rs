// src/error.rs

//! Unified error handling for the schedule client.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Status reserved for "no HTTP response was received".
pub const NETWORK_STATUS: u16 = 0;

/// Failure reported by the backend, or by the network on the way to it.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message} (status {status})")]
pub struct BackendError {
    /// Server-supplied or best-effort message
    pub message: String,

    /// HTTP status, or [`NETWORK_STATUS`] when nothing came back
    pub status: u16,

    /// Raw response body, if there was one
    pub payload: Option<Value>,
}

impl BackendError {
    /// Create a rejection carrying a real HTTP status.
    pub fn rejected(status: u16, message: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            message: message.into(),
            status,
            payload,
        }
    }

    /// Create a network failure (no response reached the client).
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: NETWORK_STATUS,
            payload: None,
        }
    }

    pub fn is_network(&self) -> bool {
        self.status == NETWORK_STATUS
    }
}

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Backend rejection or network failure
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// HTTP client failure that is not a transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Local key-value store failure
    #[error("Storage error for {key}: {message}")]
    Storage { key: String, message: String },

    /// The user declined push notification permission
    #[error("Push notification permission denied")]
    PermissionDenied,

    /// The push provider failed to hand out a token
    #[error("Push provider error: {0}")]
    PushProvider(String),

    /// Anything the transport could not classify
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a storage error for a given key.
    pub fn storage(key: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Storage {
            key: key.into(),
            message: message.to_string(),
        }
    }

    /// Create a push provider error.
    pub fn push_provider(message: impl fmt::Display) -> Self {
        Self::PushProvider(message.to_string())
    }

    /// Backend error, if this is one.
    pub fn as_backend(&self) -> Option<&BackendError> {
        match self {
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }

    /// True when no response reached the client.
    pub fn is_network(&self) -> bool {
        self.as_backend().is_some_and(BackendError::is_network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_error_uses_zero_status() {
        let err = BackendError::network("connection refused");
        assert_eq!(err.status, NETWORK_STATUS);
        assert!(err.is_network());
        assert!(AppError::from(err).is_network());
    }

    #[test]
    fn rejection_is_not_network() {
        let err = AppError::from(BackendError::rejected(404, "Not found", None));
        assert!(!err.is_network());
        assert_eq!(err.as_backend().map(|e| e.status), Some(404));
    }

    #[test]
    fn other_errors_are_not_backend() {
        assert!(AppError::PermissionDenied.as_backend().is_none());
        assert!(!AppError::validation("x").is_network());
    }
}
