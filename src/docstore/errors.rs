//! # Document Store Errors

use thiserror::Error;

/// Result type for document store operations
pub type DocStoreResult<T> = Result<T, DocStoreError>;

/// Errors raised by the hot-tier document engine and stores built on it
#[derive(Debug, Clone, Error)]
pub enum DocStoreError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid document id: {0}")]
    InvalidKey(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(String),

    /// The backing service did not answer
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocStoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DocStoreError::NotFound(_))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, DocStoreError::AlreadyExists(_))
    }

    pub(crate) fn poisoned() -> Self {
        DocStoreError::Internal("Lock poisoned".into())
    }
}

impl From<std::io::Error> for DocStoreError {
    fn from(e: std::io::Error) -> Self {
        DocStoreError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for DocStoreError {
    fn from(e: serde_json::Error) -> Self {
        DocStoreError::Serialization(e.to_string())
    }
}
