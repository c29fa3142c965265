//! Error types for the QoE measurement task.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the QoE measurement crates.
///
/// A measurement timeout is deliberately absent: it is an expected outcome and
/// is reported as a failed `MeasurementResult`, not as an error.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QoeError {
    /// The task descriptor cannot describe a runnable task
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The run was interrupted by the caller before an outcome was reached
    #[error("Measurement cancelled")]
    Cancelled,

    /// Notification channel error (subscribe/unsubscribe)
    #[error("Notification channel error: {0}")]
    Channel(String),

    /// External probe worker error
    #[error("Probe worker error: {0}")]
    Worker(String),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system or process operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON"
        message: String,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl QoeError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an InvalidConfiguration error
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    /// Creates a Channel error
    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel(message.into())
    }

    /// Creates a Worker error
    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is an InvalidConfiguration error
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration(_))
    }

    /// Check if the run was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for QoeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for QoeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for QoeError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, QoeError>`.
pub type Result<T> = std::result::Result<T, QoeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion_keeps_kind() {
        let err: QoeError = std::io::Error::new(std::io::ErrorKind::NotFound, "probe").into();
        match err {
            QoeError::Io { message } => assert!(message.contains("NotFound")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_json_error_is_serialization() {
        let err: QoeError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(err.is_serialization());
    }
}
