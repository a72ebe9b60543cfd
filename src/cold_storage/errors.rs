//! # Cold Storage Errors

use thiserror::Error;

/// Result type for cold-tier operations
pub type ColdStoreResult<T> = Result<T, ColdStoreError>;

#[derive(Debug, Clone, Error)]
pub enum ColdStoreError {
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    IoError(String),

    /// The object service did not answer
    #[error("Cold store unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ColdStoreError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ColdStoreError::ObjectNotFound(_) => 404,
            ColdStoreError::InvalidPath(_) => 400,
            ColdStoreError::IoError(_) => 500,
            ColdStoreError::Unavailable(_) => 503,
            ColdStoreError::Internal(_) => 500,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ColdStoreError::ObjectNotFound(_))
    }

    pub(crate) fn from_io(path: &str, e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            ColdStoreError::ObjectNotFound(path.to_string())
        } else {
            ColdStoreError::IoError(e.to_string())
        }
    }
}
