//! Error types for the replog_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for replog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Entry input was rejected before reaching the store
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No entry exists with the given id
    #[error("Entry not found: {0}")]
    NotFound(String),

    /// The backing store could not complete the operation
    #[error("Store error: {0}")]
    Store(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for errors caused by the caller's input rather than infrastructure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// True when the requested entry does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

/// Reasons an entry write is rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A required field was absent or blank
    #[error("`{0}` is required")]
    MissingField(&'static str),

    /// RPE outside the 1-10 scale
    #[error("`rpe` must be between 1 and 10, got {0}")]
    RpeOutOfRange(f64),

    /// A numeric field could not be parsed
    #[error("`{field}` is not a valid number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    /// The date could not be parsed
    #[error("`date` is not a valid date: {0:?}")]
    InvalidDate(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let validation: Error = ValidationError::MissingField("reps").into();
        assert!(validation.is_validation());
        assert!(!validation.is_not_found());

        let missing = Error::NotFound("abc".into());
        assert!(missing.is_not_found());
        assert!(!missing.is_validation());

        assert!(!Error::Store("disk full".into()).is_not_found());
    }
}
