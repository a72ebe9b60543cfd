//! Tiering counters
//!
//! - Counters only, monotonic, reset on process start
//! - Relaxed atomics; a snapshot is approximate across counters

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for archival, lookup and restore
#[derive(Debug, Default)]
pub struct TieringMetrics {
    archive_runs: AtomicU64,
    archive_runs_failed: AtomicU64,
    records_archived: AtomicU64,
    records_failed: AtomicU64,
    records_skipped: AtomicU64,
    lookups_primary: AtomicU64,
    lookups_indexed: AtomicU64,
    lookups_fallback: AtomicU64,
    lookups_missed: AtomicU64,
    restores: AtomicU64,
    restores_failed: AtomicU64,
}

impl TieringMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_archive_runs(&self) {
        Self::bump(&self.archive_runs);
    }

    pub fn increment_archive_runs_failed(&self) {
        Self::bump(&self.archive_runs_failed);
    }

    pub fn increment_records_archived(&self) {
        Self::bump(&self.records_archived);
    }

    pub fn increment_records_failed(&self) {
        Self::bump(&self.records_failed);
    }

    pub fn increment_records_skipped(&self) {
        Self::bump(&self.records_skipped);
    }

    pub fn increment_lookups_primary(&self) {
        Self::bump(&self.lookups_primary);
    }

    pub fn increment_lookups_indexed(&self) {
        Self::bump(&self.lookups_indexed);
    }

    pub fn increment_lookups_fallback(&self) {
        Self::bump(&self.lookups_fallback);
    }

    pub fn increment_lookups_missed(&self) {
        Self::bump(&self.lookups_missed);
    }

    pub fn increment_restores(&self) {
        Self::bump(&self.restores);
    }

    pub fn increment_restores_failed(&self) {
        Self::bump(&self.restores_failed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        MetricsSnapshot {
            archive_runs: load(&self.archive_runs),
            archive_runs_failed: load(&self.archive_runs_failed),
            records_archived: load(&self.records_archived),
            records_failed: load(&self.records_failed),
            records_skipped: load(&self.records_skipped),
            lookups_primary: load(&self.lookups_primary),
            lookups_indexed: load(&self.lookups_indexed),
            lookups_fallback: load(&self.lookups_fallback),
            lookups_missed: load(&self.lookups_missed),
            restores: load(&self.restores),
            restores_failed: load(&self.restores_failed),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self.snapshot()).unwrap_or_else(|_| serde_json::json!({}))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub archive_runs: u64,
    pub archive_runs_failed: u64,
    pub records_archived: u64,
    pub records_failed: u64,
    pub records_skipped: u64,
    pub lookups_primary: u64,
    pub lookups_indexed: u64,
    pub lookups_fallback: u64,
    pub lookups_missed: u64,
    pub restores: u64,
    pub restores_failed: u64,
}
