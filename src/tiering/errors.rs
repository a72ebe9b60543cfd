//! # Tiering Errors

use thiserror::Error;

use crate::billing::ValidationError;
use crate::cold_storage::ColdStoreError;
use crate::docstore::DocStoreError;

/// Result type for engine operations
pub type TieringResult<T> = Result<T, TieringError>;

/// Which store a failed call went to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Primary,
    Index,
    Cold,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Primary => "primary",
            StoreKind::Index => "archive_index",
            StoreKind::Cold => "cold",
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum TieringError {
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A single store call failed
    #[error("{} store failed: {message}", .store.as_str())]
    TransientStore { store: StoreKind, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid patch: {0}")]
    InvalidPatch(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Blob does not decode or fails its checksum
    #[error("Corrupt archive object {path}: {reason}")]
    Corrupt { path: String, reason: String },
}

impl TieringError {
    pub(crate) fn store(store: StoreKind, message: impl Into<String>) -> Self {
        TieringError::TransientStore {
            store,
            message: message.into(),
        }
    }

    pub(crate) fn from_primary(e: DocStoreError) -> Self {
        Self::store(StoreKind::Primary, e.to_string())
    }

    pub(crate) fn from_index(e: DocStoreError) -> Self {
        Self::store(StoreKind::Index, e.to_string())
    }

    pub fn code(&self) -> &'static str {
        match self {
            TieringError::NotFound(_) => "BILLVAULT_NOT_FOUND",
            TieringError::TransientStore { .. } => "BILLVAULT_STORE_UNAVAILABLE",
            TieringError::Configuration(_) => "BILLVAULT_CONFIG_INVALID",
            TieringError::InvalidPatch(_) => "BILLVAULT_INVALID_PATCH",
            TieringError::Conflict(_) => "BILLVAULT_CONFLICT",
            TieringError::Corrupt { .. } => "BILLVAULT_CORRUPT_OBJECT",
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            TieringError::NotFound(_) => 404,
            TieringError::TransientStore { .. } => 503,
            TieringError::Configuration(_) => 500,
            TieringError::InvalidPatch(_) => 400,
            TieringError::Conflict(_) => 409,
            TieringError::Corrupt { .. } => 500,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TieringError::NotFound(_))
    }
}

impl From<ColdStoreError> for TieringError {
    fn from(e: ColdStoreError) -> Self {
        match e {
            ColdStoreError::ObjectNotFound(path) => TieringError::NotFound(path),
            other => Self::store(StoreKind::Cold, other.to_string()),
        }
    }
}

impl From<ValidationError> for TieringError {
    fn from(e: ValidationError) -> Self {
        TieringError::InvalidPatch(e.to_string())
    }
}
