//! # Billing Validation Errors

use thiserror::Error;

pub type ValidationResult<T> = Result<T, ValidationError>;

/// A billing record or patch failed validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Patch does not change any field")]
    EmptyPatch,

    #[error("Malformed document: {0}")]
    Malformed(String),
}

impl ValidationError {
    pub(crate) fn field(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
