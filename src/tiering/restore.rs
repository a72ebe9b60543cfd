//! # Restore and Reconciliation

use std::collections::{BTreeMap, BTreeSet};

use super::engine::TieringEngine;
use super::errors::{TieringError, TieringResult};
use super::outcome::ReconcileOutcome;
use crate::archive_index::ArchiveIndexEntry;
use crate::docstore::validate_key;
use crate::observability::{Event, Logger, ObservationScope};

impl TieringEngine {
    /// Move an archived record back into the hot tier.
    ///
    /// Returns `true` once the record is live in the hot tier, even if the
    /// cold blob or index entry could not be removed afterwards.
    pub fn restore_record(&self, id: &str) -> bool {
        match self.try_restore(id) {
            Ok(()) => {
                self.metrics.increment_restores();
                true
            }
            Err(e) => {
                let reason = e.to_string();
                Logger::emit(Event::RestoreFailed, &[("id", id), ("reason", reason.as_str())]);
                self.metrics.increment_restores_failed();
                false
            }
        }
    }

    fn try_restore(&self, id: &str) -> TieringResult<()> {
        validate_key(id).map_err(|_| TieringError::NotFound(id.to_string()))?;
        let entry = self.index.get(id).map_err(|e| {
            if e.is_not_found() {
                TieringError::NotFound(id.to_string())
            } else {
                TieringError::from_index(e)
            }
        })?;

        let record = self.read_blob(&entry.cold_path, Some(&entry))?;
        if record.id != id {
            return Err(TieringError::Corrupt {
                path: entry.cold_path.clone(),
                reason: format!("blob holds record '{}'", record.id),
            });
        }

        match self.primary.create(&record) {
            Ok(()) => {}
            // Already live; finish the cleanup below
            Err(e) if e.is_already_exists() => {
                Logger::emit(
                    Event::RestoreCleanupIncomplete,
                    &[("id", id), ("reason", "record already live in primary")],
                );
            }
            Err(e) => return Err(TieringError::from_primary(e)),
        }

        if let Err(e) = self.cold.delete(&entry.cold_path) {
            if !e.is_not_found() {
                let reason = e.to_string();
                Logger::emit(
                    Event::RestoreCleanupIncomplete,
                    &[("id", id), ("step", "cold_delete"), ("reason", reason.as_str())],
                );
            }
        }
        if let Err(e) = self.index.delete(id) {
            if !e.is_not_found() {
                let reason = e.to_string();
                Logger::emit(
                    Event::RestoreCleanupIncomplete,
                    &[("id", id), ("step", "index_delete"), ("reason", reason.as_str())],
                );
            }
        }

        Logger::emit(Event::RestoreComplete, &[("id", id)]);
        Ok(())
    }

    /// Repair leftovers of interrupted migrations and restores.
    ///
    /// - A cold blob whose record is live in the hot tier is removed, with its
    ///   index entry.
    /// - An index entry whose blob is gone is removed.
    ///
    /// Refused while an archival run is active.
    pub fn reconcile(&self) -> TieringResult<ReconcileOutcome> {
        let _guard = self.begin_maintenance().ok_or_else(|| {
            TieringError::Conflict("an archival or reconciliation run is in progress".into())
        })?;

        let scope = ObservationScope::new("RECONCILE");
        let mut outcome = ReconcileOutcome::default();
        let (entries, blobs) = match self.reconcile_inputs() {
            Ok(inputs) => inputs,
            Err(e) => {
                scope.fail(&e.to_string());
                return Err(e);
            }
        };
        let owner_by_path: BTreeMap<&str, &str> = entries
            .iter()
            .map(|entry| (entry.cold_path.as_str(), entry.id.as_str()))
            .collect();
        let mut removed_entries: BTreeSet<String> = BTreeSet::new();

        for path in blobs {
            let id = match owner_by_path.get(path.as_str()) {
                Some(id) => id.to_string(),
                None => match path.strip_suffix(".json") {
                    Some(id) if !id.contains('/') => id.to_string(),
                    _ => continue,
                },
            };

            match self.primary.get(&id) {
                Ok(_) => {}
                Err(e) if e.is_not_found() => continue,
                Err(e) => {
                    self.reconcile_failed(&mut outcome, &id, TieringError::from_primary(e));
                    continue;
                }
            }

            if let Err(e) = self.cold.delete(&path) {
                if !e.is_not_found() {
                    self.reconcile_failed(&mut outcome, &id, e.into());
                    continue;
                }
            }
            outcome.orphan_blobs_removed += 1;
            Logger::emit(Event::OrphanBlobRemoved, &[("id", id.as_str()), ("cold_path", path.as_str())]);

            match self.index.delete(&id) {
                Ok(()) => {
                    outcome.stale_entries_removed += 1;
                    removed_entries.insert(id);
                }
                Err(e) if e.is_not_found() => {}
                Err(e) => self.reconcile_failed(&mut outcome, &id, TieringError::from_index(e)),
            }
        }

        for entry in &entries {
            if removed_entries.contains(&entry.id) {
                continue;
            }
            match self.cold.exists(&entry.cold_path) {
                Ok(true) => {}
                Ok(false) => match self.index.delete(&entry.id) {
                    Ok(()) => {
                        outcome.stale_entries_removed += 1;
                        Logger::emit(
                            Event::StaleIndexEntryRemoved,
                            &[("id", entry.id.as_str()), ("cold_path", entry.cold_path.as_str())],
                        );
                    }
                    Err(e) if e.is_not_found() => {}
                    Err(e) => {
                        self.reconcile_failed(&mut outcome, &entry.id, TieringError::from_index(e))
                    }
                },
                Err(e) => self.reconcile_failed(&mut outcome, &entry.id, e.into()),
            }
        }

        let orphans = outcome.orphan_blobs_removed.to_string();
        let stale = outcome.stale_entries_removed.to_string();
        let failed = outcome.failed_count.to_string();
        scope.complete_with_fields(&[
            ("orphan_blobs_removed", orphans.as_str()),
            ("stale_entries_removed", stale.as_str()),
            ("failed_count", failed.as_str()),
        ]);
        Ok(outcome)
    }

    fn reconcile_inputs(&self) -> TieringResult<(Vec<ArchiveIndexEntry>, Vec<String>)> {
        let entries = self.index.list().map_err(TieringError::from_index)?;
        let blobs = self.cold.list(None)?;
        Ok((entries, blobs))
    }

    fn reconcile_failed(&self, outcome: &mut ReconcileOutcome, id: &str, error: TieringError) {
        outcome.failed_count += 1;
        let reason = error.to_string();
        Logger::emit(Event::ReconcileItemFailed, &[("id", id), ("reason", reason.as_str())]);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use super::*;
    use crate::archive_index::CollectionArchiveIndex;
    use crate::billing::BillingRecord;
    use crate::cold_storage::MemoryColdStore;
    use crate::primary::CollectionPrimaryStore;
    use crate::tiering::{TieringConfig, Tier};

    fn engine() -> TieringEngine {
        TieringEngine::new(
            Arc::new(CollectionPrimaryStore::in_memory()),
            Arc::new(MemoryColdStore::new()),
            Arc::new(CollectionArchiveIndex::in_memory()),
            TieringConfig::new(90, 10),
        )
        .unwrap()
    }

    fn archived(engine: &TieringEngine, id: &str) -> BillingRecord {
        let mut record = BillingRecord::new(id, "cust-1", 10.0, 30);
        record.created_at = Utc::now() - Duration::days(120);
        engine.primary.create(&record).unwrap();
        assert_eq!(engine.archive_old_records().archived_count, 1);
        record
    }

    #[test]
    fn test_restore_round_trip() {
        let engine = engine();
        let record = archived(&engine, "inv-1");

        assert!(engine.restore_record("inv-1"));
        let resolved = engine.resolve_record("inv-1").unwrap();
        assert_eq!(resolved.source, Tier::Primary);
        assert_eq!(resolved.record, record);
        assert!(engine.index.get("inv-1").unwrap_err().is_not_found());
        assert!(!engine.cold.exists("inv-1.json").unwrap());
    }

    #[test]
    fn test_restore_without_entry_mutates_nothing() {
        let engine = engine();
        let record = BillingRecord::new("inv-1", "cust-1", 1.0, 30);
        engine.cold.put("inv-1.json", &record.to_json_bytes().unwrap()).unwrap();

        assert!(!engine.restore_record("inv-1"));
        assert!(engine.cold.exists("inv-1.json").unwrap());
        assert!(engine.primary.get("inv-1").unwrap_err().is_not_found());
        assert_eq!(engine.metrics.snapshot().restores_failed, 1);
    }

    #[test]
    fn test_restore_with_missing_blob_fails() {
        let engine = engine();
        let now = Utc::now();
        engine
            .index
            .create(&ArchiveIndexEntry::new("inv-1", "inv-1.json", now, now))
            .unwrap();
        assert!(!engine.restore_record("inv-1"));
        assert!(engine.index.get("inv-1").is_ok());
    }

    #[test]
    fn test_restore_rejects_tampered_blob() {
        let engine = engine();
        archived(&engine, "inv-1");
        let mut tampered = BillingRecord::new("inv-1", "cust-1", 9999.0, 30);
        tampered.created_at = Utc::now() - Duration::days(120);
        engine.cold.put("inv-1.json", &tampered.to_json_bytes().unwrap()).unwrap();

        assert!(!engine.restore_record("inv-1"));
        assert!(engine.primary.get("inv-1").unwrap_err().is_not_found());
    }

    #[test]
    fn test_restore_when_already_live_finishes_cleanup() {
        let engine = engine();
        let record = archived(&engine, "inv-1");
        engine.primary.create(&record).unwrap();

        assert!(engine.restore_record("inv-1"));
        assert!(engine.index.get("inv-1").unwrap_err().is_not_found());
        assert!(!engine.cold.exists("inv-1.json").unwrap());
    }

    #[test]
    fn test_reconcile_removes_orphans_and_stale_entries() {
        let engine = engine();
        let now = Utc::now();

        // interrupted migration: blob and entry written, hot delete never happened
        let live = BillingRecord::new("live", "cust-1", 1.0, 30);
        engine.primary.create(&live).unwrap();
        engine.cold.put("live.json", &live.to_json_bytes().unwrap()).unwrap();
        engine
            .index
            .create(&ArchiveIndexEntry::new("live", "live.json", now, now))
            .unwrap();

        // entry without blob
        engine
            .index
            .create(&ArchiveIndexEntry::new("ghost", "ghost.json", now, now))
            .unwrap();

        // healthy archive
        archived(&engine, "kept");

        let outcome = engine.reconcile().unwrap();
        assert_eq!(outcome.orphan_blobs_removed, 1);
        assert_eq!(outcome.stale_entries_removed, 2);
        assert_eq!(outcome.failed_count, 0);

        assert_eq!(engine.resolve_record("live").unwrap().source, Tier::Primary);
        assert!(!engine.cold.exists("live.json").unwrap());
        assert!(engine.index.get("ghost").unwrap_err().is_not_found());
        assert_eq!(engine.resolve_record("kept").unwrap().source, Tier::ArchiveIndex);
    }

    #[test]
    fn test_reconcile_refused_during_maintenance() {
        let engine = engine();
        let _guard = engine.begin_maintenance().unwrap();
        assert!(matches!(engine.reconcile(), Err(TieringError::Conflict(_))));
    }
}
