//! # Tiering Configuration

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{TieringError, TieringResult};

/// Knobs for archival runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieringConfig {
    /// Records strictly older than this many days are migrated
    #[serde(default = "default_age_threshold_days")]
    pub age_threshold_days: u32,

    /// Records per sequential batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_age_threshold_days() -> u32 {
    90
}

fn default_batch_size() -> usize {
    100
}

impl Default for TieringConfig {
    fn default() -> Self {
        Self {
            age_threshold_days: default_age_threshold_days(),
            batch_size: default_batch_size(),
        }
    }
}

impl TieringConfig {
    pub fn new(age_threshold_days: u32, batch_size: usize) -> Self {
        Self {
            age_threshold_days,
            batch_size,
        }
    }

    pub fn validate(&self) -> TieringResult<()> {
        if self.batch_size == 0 {
            return Err(TieringError::Configuration(
                "batch_size must be at least 1".into(),
            ));
        }
        self.cutoff(Utc::now())?;
        Ok(())
    }

    /// Records created strictly before this instant are due for archival
    pub fn cutoff(&self, now: DateTime<Utc>) -> TieringResult<DateTime<Utc>> {
        now.checked_sub_signed(Duration::days(i64::from(self.age_threshold_days)))
            .ok_or_else(|| {
                TieringError::Configuration(format!(
                    "age_threshold_days {} reaches before the earliest representable date",
                    self.age_threshold_days
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TieringConfig::default();
        assert_eq!(config.age_threshold_days, 90);
        assert_eq!(config.batch_size, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_batch_rejected() {
        let config = TieringConfig::new(90, 0);
        assert!(matches!(config.validate(), Err(TieringError::Configuration(_))));
    }

    #[test]
    fn test_unrepresentable_threshold_rejected() {
        let config = TieringConfig::new(u32::MAX, 10);
        assert!(matches!(config.validate(), Err(TieringError::Configuration(_))));
        assert!(config.cutoff(Utc::now()).is_err());
    }

    #[test]
    fn test_cutoff_subtracts_threshold() {
        let now = Utc::now();
        let cutoff = TieringConfig::new(90, 10).cutoff(now).unwrap();
        assert_eq!(now - cutoff, Duration::days(90));
    }

    #[test]
    fn test_zero_threshold_allowed() {
        assert!(TieringConfig::new(0, 10).validate().is_ok());
    }
}
