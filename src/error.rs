// Error types for tlsprofile
//
// Probe outcomes are never errors: they are reported as `TlsProbeResult` data.
// These types cover the ambient failures (configuration, command spawning,
// decoding kubectl output) and carry the evidence text of a failed handshake
// attempt into the classifier.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Main error type for tlsprofile operations
#[derive(Debug, Error)]
pub enum TlsError {
    /// TCP connect did not complete within the dial timeout
    #[error("Connection timed out after {duration:?} to {addr}")]
    ConnectionTimeout { duration: Duration, addr: String },

    /// Handshake stalled past the socket timeout
    #[error("Handshake timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// TLS handshake failed; `details` holds the library's error text
    #[error("TLS handshake failed: {details}")]
    InvalidHandshake { details: String },

    /// Generic I/O error
    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: io::Error,
    },

    /// OpenSSL-specific errors
    #[error("OpenSSL error: {0}")]
    OpenSslError(#[from] openssl::error::ErrorStack),

    /// External command could not be run or returned garbage
    #[error("Command `{command}` failed: {details}")]
    CommandFailed { command: String, details: String },

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {message}")]
    ConfigError { message: String },

    /// Invalid input that would be interpolated into a shell command
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl From<tokio::task::JoinError> for TlsError {
    fn from(err: tokio::task::JoinError) -> Self {
        TlsError::IoError {
            source: io::Error::other(format!("Task join error: {}", err)),
        }
    }
}

impl From<crate::security::ValidationError> for TlsError {
    fn from(err: crate::security::ValidationError) -> Self {
        TlsError::InvalidInput {
            message: err.to_string(),
        }
    }
}
