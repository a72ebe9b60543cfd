//! # Tiering Engine
//!
//! Owns the three stores and resolves records across them. Archival,
//! restore and reconciliation live in sibling modules as further `impl`
//! blocks on [`TieringEngine`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use super::config::TieringConfig;
use super::errors::{TieringError, TieringResult};
use super::outcome::{ResolvedRecord, Tier};
use crate::archive_index::{ArchiveIndex, ArchiveIndexEntry};
use crate::billing::{BillingPatch, BillingRecord};
use crate::cold_storage::{ColdStore, ColdStoreError};
use crate::docstore::validate_key;
use crate::observability::{Event, Logger, TieringMetrics};
use crate::primary::PrimaryStore;

/// Cold-tier path a record is uploaded to
pub fn canonical_cold_path(id: &str) -> String {
    format!("{}.json", id)
}

#[derive(Debug)]
pub struct TieringEngine {
    pub(super) primary: Arc<dyn PrimaryStore>,
    pub(super) cold: Arc<dyn ColdStore>,
    pub(super) index: Arc<dyn ArchiveIndex>,
    pub(super) config: TieringConfig,
    pub(super) metrics: Arc<TieringMetrics>,
    /// Set while an archival run or reconciliation pass is active
    maintenance: AtomicBool,
}

/// Releases the maintenance flag on drop
pub(super) struct MaintenanceGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for MaintenanceGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

impl TieringEngine {
    pub fn new(
        primary: Arc<dyn PrimaryStore>,
        cold: Arc<dyn ColdStore>,
        index: Arc<dyn ArchiveIndex>,
        config: TieringConfig,
    ) -> TieringResult<Self> {
        config.validate()?;
        Ok(Self {
            primary,
            cold,
            index,
            config,
            metrics: Arc::new(TieringMetrics::new()),
            maintenance: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &TieringConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<TieringMetrics> {
        &self.metrics
    }

    pub fn primary(&self) -> &Arc<dyn PrimaryStore> {
        &self.primary
    }

    pub fn cold(&self) -> &Arc<dyn ColdStore> {
        &self.cold
    }

    pub fn index(&self) -> &Arc<dyn ArchiveIndex> {
        &self.index
    }

    /// Archival and reconciliation exclude each other; `None` when one is running
    pub(super) fn begin_maintenance(&self) -> Option<MaintenanceGuard<'_>> {
        self.maintenance
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| MaintenanceGuard {
                flag: &self.maintenance,
            })
    }

    /// Fetch a record from whichever tier holds it
    pub fn get_record(&self, id: &str) -> TieringResult<BillingRecord> {
        self.resolve_record(id).map(|resolved| resolved.record)
    }

    /// Fallback resolution: primary, then indexed blob, then canonical blob.
    ///
    /// A failing step is logged and skipped. With no hit, the first step
    /// failure is returned, or `NotFound` when every step simply missed.
    pub fn resolve_record(&self, id: &str) -> TieringResult<ResolvedRecord> {
        // An id the hot store cannot key was never stored anywhere
        if id.trim().is_empty() || validate_key(id).is_err() {
            return Err(TieringError::NotFound(id.to_string()));
        }
        let mut first_failure: Option<TieringError> = None;

        match self.primary.get(id) {
            Ok(record) => return Ok(self.resolved(record, Tier::Primary)),
            Err(e) if e.is_not_found() => {}
            Err(e) => note_failure(id, Tier::Primary, TieringError::from_primary(e), &mut first_failure),
        }

        let canonical = canonical_cold_path(id);
        let mut indexed_path = None;
        match self.index.get(id) {
            Ok(entry) => {
                match self.read_blob(&entry.cold_path, Some(&entry)) {
                    Ok(record) => return Ok(self.resolved(record, Tier::ArchiveIndex)),
                    Err(e) => {
                        let reason = e.to_string();
                        Logger::emit(
                            Event::IndexEntryStale,
                            &[
                                ("id", id),
                                ("cold_path", entry.cold_path.as_str()),
                                ("reason", reason.as_str()),
                            ],
                        );
                        if !e.is_not_found() {
                            first_failure.get_or_insert(e);
                        }
                    }
                }
                indexed_path = Some(entry.cold_path);
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => note_failure(id, Tier::ArchiveIndex, TieringError::from_index(e), &mut first_failure),
        }

        if indexed_path.as_deref() != Some(canonical.as_str()) {
            match self.read_blob(&canonical, None) {
                Ok(record) => return Ok(self.resolved(record, Tier::ColdFallback)),
                Err(e) if e.is_not_found() => {}
                Err(e) => note_failure(id, Tier::ColdFallback, e, &mut first_failure),
            }
        }

        self.metrics.increment_lookups_missed();
        Logger::emit(Event::RecordNotFound, &[("id", id)]);
        Err(first_failure.unwrap_or_else(|| TieringError::NotFound(id.to_string())))
    }

    fn resolved(&self, record: BillingRecord, source: Tier) -> ResolvedRecord {
        match source {
            Tier::Primary => self.metrics.increment_lookups_primary(),
            Tier::ArchiveIndex => self.metrics.increment_lookups_indexed(),
            Tier::ColdFallback => self.metrics.increment_lookups_fallback(),
        }
        Logger::emit(
            Event::RecordResolved,
            &[("id", record.id.as_str()), ("source", source.as_str())],
        );
        ResolvedRecord { record, source }
    }

    /// Read and decode a cold blob, verifying the entry's checksum if given
    pub(super) fn read_blob(
        &self,
        path: &str,
        entry: Option<&ArchiveIndexEntry>,
    ) -> TieringResult<BillingRecord> {
        let bytes = self.cold.get(path).map_err(|e| match e {
            ColdStoreError::InvalidPath(_) => TieringError::NotFound(path.to_string()),
            other => other.into(),
        })?;
        if let Some(entry) = entry {
            if !entry.matches_blob(&bytes) {
                return Err(TieringError::Corrupt {
                    path: path.to_string(),
                    reason: "checksum mismatch".into(),
                });
            }
        }
        BillingRecord::from_json_bytes(&bytes).map_err(|e| TieringError::Corrupt {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    /// Whether the record currently sits in the cold tier
    fn is_archived(&self, id: &str) -> TieringResult<bool> {
        match self.index.get(id) {
            Ok(_) => return Ok(true),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(TieringError::from_index(e)),
        }
        Ok(self.cold.exists(&canonical_cold_path(id))?)
    }

    /// Insert a new record into the hot tier, assigning an id when empty
    pub fn create_record(&self, mut record: BillingRecord) -> TieringResult<BillingRecord> {
        if !record.has_id() {
            record.id = Uuid::new_v4().to_string();
        }
        validate_key(&record.id).map_err(|e| TieringError::InvalidPatch(e.to_string()))?;
        record.validate()?;
        if self.is_archived(&record.id)? {
            return Err(TieringError::Conflict(format!(
                "record {} is archived",
                record.id
            )));
        }
        match self.primary.create(&record) {
            Ok(()) => Ok(record),
            Err(e) if e.is_already_exists() => Err(TieringError::Conflict(format!(
                "record {} already exists",
                record.id
            ))),
            Err(e) => Err(TieringError::from_primary(e)),
        }
    }

    /// Apply a partial update to a hot record. Archived records must be
    /// restored first.
    pub fn update_record(&self, id: &str, patch: &BillingPatch) -> TieringResult<BillingRecord> {
        patch.validate()?;
        if validate_key(id).is_err() {
            return Err(TieringError::NotFound(id.to_string()));
        }
        match self.primary.update(id, patch) {
            Ok(record) => Ok(record),
            Err(e) if e.is_not_found() => {
                if self.is_archived(id)? {
                    Err(TieringError::Conflict(format!(
                        "record {} is archived; restore it before updating",
                        id
                    )))
                } else {
                    Err(TieringError::NotFound(id.to_string()))
                }
            }
            Err(e) => Err(TieringError::from_primary(e)),
        }
    }

    /// Remove the record from every tier holding it. Returns whether
    /// anything was removed.
    pub fn delete_record(&self, id: &str) -> TieringResult<bool> {
        if validate_key(id).is_err() {
            return Ok(false);
        }
        let mut removed = false;

        match self.index.get(id) {
            Ok(entry) => {
                removed |= ignore_missing(self.cold.delete(&entry.cold_path))?;
                removed |= ignore_missing_doc(self.index.delete(id)).map_err(TieringError::from_index)?;
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(TieringError::from_index(e)),
        }
        removed |= ignore_missing(self.cold.delete(&canonical_cold_path(id)))?;
        removed |= ignore_missing_doc(self.primary.delete(id)).map_err(TieringError::from_primary)?;

        Ok(removed)
    }
}

fn note_failure(id: &str, step: Tier, error: TieringError, first: &mut Option<TieringError>) {
    let reason = error.to_string();
    Logger::emit(
        Event::LookupStepFailed,
        &[("id", id), ("step", step.as_str()), ("reason", reason.as_str())],
    );
    first.get_or_insert(error);
}

/// `Ok(true)` when deleted, `Ok(false)` when already absent
fn ignore_missing(result: crate::cold_storage::ColdStoreResult<()>) -> TieringResult<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn ignore_missing_doc(result: crate::docstore::DocStoreResult<()>) -> crate::docstore::DocStoreResult<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(e),
    }
}
