//! Error types for formgate.

use thiserror::Error;

/// Main error type for the crate.
///
/// Only setup paths are fallible: loading configuration and loading the
/// token secret. Sanitization never fails, token verification reports
/// through booleans or [`crate::guard::Rejection`], and audit logging
/// swallows storage failures.
#[derive(Error, Debug)]
pub enum DefenseError {
    /// Configuration-related errors.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Secret loading or key material errors.
    #[error("Secret error: {message}")]
    Secret { message: String },

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for formgate operations.
pub type DefenseResult<T> = Result<T, DefenseError>;
