//! Shared error types for the Relay domain layer

use thiserror::Error;

/// Errors produced by the foundational domain types
#[derive(Debug, Error)]
pub enum RelayError {
    /// A manifest field failed schema validation
    #[error("Invalid manifest field {field}: {reason}")]
    InvalidField { field: String, reason: String },

    /// Required configuration is missing or malformed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RelayError {
    /// Convenience constructor for field validation failures
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for domain operations
pub type RelayResult<T> = Result<T, RelayError>;
