//! Core error types for autoform-rs.
//!
//! [`AutoformError`] covers schema, configuration, serialization, and I/O
//! failures. Field validation is deliberately absent: a failed validation
//! pass is ordinary form state, not an error.

use thiserror::Error;

/// A failure reported by a persistence collaborator.
///
/// The collaborator decides the wording; the form engine surfaces the
/// message verbatim and does not distinguish transient from permanent
/// causes.
///
/// # Examples
///
/// ```
/// use autoform_core::error::PersistenceError;
///
/// let err = PersistenceError::new("permission denied");
/// assert_eq!(err.to_string(), "permission denied");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct PersistenceError {
    /// Human-readable description of the failure.
    pub message: String,
}

impl PersistenceError {
    /// Creates a new `PersistenceError` with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The primary error type for autoform-rs.
#[derive(Error, Debug)]
pub enum AutoformError {
    // ── Schema ───────────────────────────────────────────────────────

    /// A form schema could not be parsed or contains an invalid field.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// An operation named a field that the schema does not declare.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── Persistence ──────────────────────────────────────────────────

    /// The persistence collaborator rejected an operation.
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<serde_json::Error> for AutoformError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// A convenience type alias for `Result<T, AutoformError>`.
pub type AutoformResult<T> = Result<T, AutoformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_error_display() {
        let err = PersistenceError::new("quota exceeded");
        assert_eq!(err.to_string(), "quota exceeded");
    }

    #[test]
    fn test_autoform_error_display() {
        let err = AutoformError::InvalidSchema("field 'age': bad pattern".into());
        assert_eq!(err.to_string(), "Invalid schema: field 'age': bad pattern");

        let err = AutoformError::UnknownField("nickname".into());
        assert_eq!(err.to_string(), "Unknown field: nickname");
    }

    #[test]
    fn test_persistence_error_conversion() {
        let err: AutoformError = PersistenceError::new("offline").into();
        assert!(matches!(err, AutoformError::Persistence(_)));
        assert_eq!(err.to_string(), "Persistence error: offline");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: AutoformError = io_err.into();
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: AutoformError = json_err.into();
        assert!(matches!(err, AutoformError::SerializationError(_)));
    }
}
