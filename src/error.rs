//! Error types for labbcat
//!
//! Remote-call failures are not represented here: they travel in the `errors` slot of a
//! [`CallOutcome`](crate::types::CallOutcome) so every terminal state of a request reaches the
//! caller the same way. This module covers the local side:
//! - Invalid configuration (with the offending key)
//! - HTTP client construction
//! - File system and serialization failures

use thiserror::Error;

/// Result type alias for labbcat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for labbcat
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "base_url")
        key: Option<String>,
    },

    /// HTTP client could not be built or a request could not be prepared
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a configuration error for the given key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// The configuration key this error refers to, if any
    pub fn config_key(&self) -> Option<&str> {
        match self {
            Error::Config { key, .. } => key.as_deref(),
            _ => None,
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display_and_key() {
        let err = Error::config("base_url", "base URL must not be empty");
        assert_eq!(
            err.to_string(),
            "configuration error: base URL must not be empty"
        );
        assert_eq!(err.config_key(), Some("base_url"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.trs");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("missing.trs"));
        assert_eq!(err.config_key(), None);
    }
}
