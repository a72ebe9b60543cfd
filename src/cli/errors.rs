//! CLI errors
//!
//! Every CLI error ends the process: `main` prints it to stderr and exits
//! with status 1.

use std::io;

use thiserror::Error;

use crate::cold_storage::ColdStoreError;
use crate::config::ConfigError;
use crate::docstore::DocStoreError;
use crate::tiering::TieringError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    ConfigError,
    /// stdout or data directory
    IoError,
    AlreadyInitialized,
    NotInitialized,
    /// Stores or runtime could not be brought up
    BootFailed,
    OperationFailed,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "BILLVAULT_CLI_CONFIG_ERROR",
            Self::IoError => "BILLVAULT_CLI_IO_ERROR",
            Self::AlreadyInitialized => "BILLVAULT_CLI_ALREADY_INITIALIZED",
            Self::NotInitialized => "BILLVAULT_CLI_NOT_INITIALIZED",
            Self::BootFailed => "BILLVAULT_CLI_BOOT_FAILED",
            Self::OperationFailed => "BILLVAULT_CLI_OPERATION_FAILED",
        }
    }
}

#[derive(Debug, Error)]
#[error("{}: {message}", .code.code())]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn already_initialized() -> Self {
        Self::new(CliErrorCode::AlreadyInitialized, "data directory is already initialized")
    }

    pub fn not_initialized() -> Self {
        Self::new(
            CliErrorCode::NotInitialized,
            "data directory is not initialized; run 'billvault init' first",
        )
    }

    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BootFailed, msg)
    }

    pub fn operation_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::OperationFailed, msg)
    }

    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::new(CliErrorCode::IoError, e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(CliErrorCode::IoError, format!("could not encode output: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<DocStoreError> for CliError {
    fn from(e: DocStoreError) -> Self {
        Self::boot_failed(format!("hot tier unavailable: {}", e))
    }
}

impl From<ColdStoreError> for CliError {
    fn from(e: ColdStoreError) -> Self {
        Self::boot_failed(format!("cold tier unavailable: {}", e))
    }
}

impl From<TieringError> for CliError {
    fn from(e: TieringError) -> Self {
        match e {
            TieringError::Configuration(msg) => Self::config_error(msg),
            other => Self::operation_failed(format!("{}: {}", other.code(), other)),
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code() {
        let e = CliError::not_initialized();
        assert!(e.to_string().starts_with("BILLVAULT_CLI_NOT_INITIALIZED: "));
    }

    #[test]
    fn test_tiering_configuration_maps_to_config_error() {
        let e: CliError = TieringError::Configuration("bad".into()).into();
        assert_eq!(e.code(), CliErrorCode::ConfigError);

        let e: CliError = TieringError::NotFound("inv-1".into()).into();
        assert_eq!(e.code(), CliErrorCode::OperationFailed);
        assert!(e.message().contains("BILLVAULT_NOT_FOUND"));
    }
}
