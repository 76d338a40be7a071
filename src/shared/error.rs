//! Validation errors of the wire types in [`crate::shared`]
//!
//! Independent of the server so request payloads can be checked wherever
//! they are deserialized.
//!
//! ```rust
//! use tripcollab::shared::error::SharedError;
//!
//! let error = SharedError::validation("end_date", "end date precedes start date");
//! assert!(error.to_string().contains("end_date"));
//! ```
use thiserror::Error;

/// A payload field violates a domain rule
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    #[error("Validation error in field '{field}': {message}")]
    ValidationError { field: String, message: String },
}

impl SharedError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}
