//! # Stats Reporter

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::engine::TieringEngine;
use super::errors::{TieringError, TieringResult};
use crate::archive_index::ArchiveIndex;
use crate::cold_storage::ColdStore;
use crate::observability::{Event, Logger};
use crate::primary::PrimaryStore;

/// Counts across the three stores at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub primary_count: u64,
    pub archived_count: u64,
    pub cold_object_count: u64,
    pub threshold_days: u32,
}

/// Either a full snapshot or the reason none could be taken
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatsReport {
    Snapshot(StatsSnapshot),
    Error { error: String },
}

impl StatsReport {
    pub fn is_error(&self) -> bool {
        matches!(self, StatsReport::Error { .. })
    }
}

#[derive(Debug, Clone)]
pub struct StatsReporter {
    primary: Arc<dyn PrimaryStore>,
    index: Arc<dyn ArchiveIndex>,
    cold: Arc<dyn ColdStore>,
    threshold_days: u32,
}

impl StatsReporter {
    pub fn new(
        primary: Arc<dyn PrimaryStore>,
        index: Arc<dyn ArchiveIndex>,
        cold: Arc<dyn ColdStore>,
        threshold_days: u32,
    ) -> Self {
        Self {
            primary,
            index,
            cold,
            threshold_days,
        }
    }

    pub fn from_engine(engine: &TieringEngine) -> Self {
        Self::new(
            Arc::clone(&engine.primary),
            Arc::clone(&engine.index),
            Arc::clone(&engine.cold),
            engine.config.age_threshold_days,
        )
    }

    /// All counts or an error; never partial numbers
    pub fn snapshot(&self) -> TieringResult<StatsSnapshot> {
        Ok(StatsSnapshot {
            primary_count: self.primary.count().map_err(TieringError::from_primary)?,
            archived_count: self.index.count().map_err(TieringError::from_index)?,
            cold_object_count: self.cold.list(None)?.len() as u64,
            threshold_days: self.threshold_days,
        })
    }

    pub fn get_stats(&self) -> StatsReport {
        match self.snapshot() {
            Ok(snapshot) => StatsReport::Snapshot(snapshot),
            Err(e) => {
                let error = e.to_string();
                Logger::emit(Event::StatsFailed, &[("reason", error.as_str())]);
                StatsReport::Error { error }
            }
        }
    }
}

impl TieringEngine {
    pub fn get_stats(&self) -> StatsReport {
        StatsReporter::from_engine(self).get_stats()
    }
}
