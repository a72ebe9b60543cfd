//! Service configuration
//!
//! Loaded from a JSON file, then overridden from the environment:
//!
//! | variable                  | field                |
//! |---------------------------|----------------------|
//! | `ARCHIVAL_DAYS_THRESHOLD` | `age_threshold_days` |
//! | `BATCH_SIZE`              | `batch_size`         |
//! | `API_HOST`                | `http.host`          |
//! | `API_PORT`                | `http.port`          |
//! | `LOG_LEVEL`               | `log_level`          |
//!
//! Any failure here is fatal at startup.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http_server::HttpServerConfig;
use crate::observability::Severity;
use crate::tiering::{ArchiveSchedule, TieringConfig, TieringError};

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Invalid config JSON: {0}")]
    Malformed(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl From<ConfigError> for TieringError {
    fn from(e: ConfigError) -> Self {
        TieringError::Configuration(e.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Data directory (required)
    pub data_dir: String,

    #[serde(default = "default_age_threshold_days")]
    pub age_threshold_days: u32,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Cron expression for scheduled archival; no schedule when absent
    #[serde(default)]
    pub archive_schedule: Option<String>,

    #[serde(default)]
    pub http: HttpServerConfig,

    /// Lowest severity written to the log streams; `INFO` when absent
    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_age_threshold_days() -> u32 {
    90
}

fn default_batch_size() -> usize {
    100
}

impl ServiceConfig {
    pub fn new(data_dir: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            age_threshold_days: default_age_threshold_days(),
            batch_size: default_batch_size(),
            archive_schedule: None,
            http: HttpServerConfig::default(),
            log_level: None,
        }
    }

    /// Read, apply environment overrides, validate
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut config = Self::from_json(&content)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::Malformed(e.to_string()))
    }

    /// Apply overrides from `lookup`, normally the process environment
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("ARCHIVAL_DAYS_THRESHOLD") {
            self.age_threshold_days = parse_override("ARCHIVAL_DAYS_THRESHOLD", &value)?;
        }
        if let Some(value) = lookup("BATCH_SIZE") {
            self.batch_size = parse_override("BATCH_SIZE", &value)?;
        }
        if let Some(value) = lookup("API_HOST") {
            self.http.host = value;
        }
        if let Some(value) = lookup("API_PORT") {
            self.http.port = parse_override("API_PORT", &value)?;
        }
        if let Some(value) = lookup("LOG_LEVEL") {
            self.log_level = Some(value);
        }
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "data_dir",
                reason: "must not be empty".into(),
            });
        }
        self.tiering().validate().map_err(|e| ConfigError::InvalidValue {
            field: if self.batch_size == 0 {
                "batch_size"
            } else {
                "age_threshold_days"
            },
            reason: e.to_string(),
        })?;
        self.schedule()?;
        self.log_severity()?;
        if self.http.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "http.host",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    pub fn tiering(&self) -> TieringConfig {
        TieringConfig::new(self.age_threshold_days, self.batch_size)
    }

    /// Parsed archive schedule, if one is configured
    pub fn schedule(&self) -> ConfigResult<Option<ArchiveSchedule>> {
        match self.archive_schedule.as_deref() {
            Some(expression) => ArchiveSchedule::parse(expression)
                .map(Some)
                .map_err(|e| ConfigError::InvalidValue {
                    field: "archive_schedule",
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    pub fn log_severity(&self) -> ConfigResult<Severity> {
        match self.log_level.as_deref() {
            Some(level) => level
                .parse()
                .map_err(|reason| ConfigError::InvalidValue {
                    field: "log_level",
                    reason,
                }),
            None => Ok(Severity::Info),
        }
    }

    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    /// Hot-tier documents and the archive index
    pub fn hot_dir(&self) -> PathBuf {
        self.data_path().join("hot")
    }

    /// Cold-tier objects
    pub fn cold_dir(&self) -> PathBuf {
        self.data_path().join("cold")
    }
}

fn parse_override<T: std::str::FromStr>(name: &'static str, value: &str) -> ConfigResult<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        field: name,
        reason: format!("'{}': {}", value, e),
    })
}
