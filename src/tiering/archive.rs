//! # Batch Archival
//!
//! Selects hot records older than the cutoff and migrates each one:
//! upload blob, write index entry, delete from the hot tier. Steps are not
//! rolled back; a record that fails midway is still readable through the
//! canonical-path fallback and picked up again by the next run.

use chrono::{DateTime, Utc};

use super::cancel::CancelSignal;
use super::engine::{canonical_cold_path, TieringEngine};
use super::errors::{TieringError, TieringResult};
use super::outcome::ArchiveOutcome;
use crate::archive_index::ArchiveIndexEntry;
use crate::billing::BillingRecord;
use crate::observability::{Event, Logger, ObservationScope};

enum Migration {
    Archived,
    Skipped,
}

impl TieringEngine {
    /// Migrate every record older than the configured threshold
    pub fn archive_old_records(&self) -> ArchiveOutcome {
        self.archive_old_records_with(&CancelSignal::new())
    }

    pub fn archive_old_records_with(&self, cancel: &CancelSignal) -> ArchiveOutcome {
        self.archive_as_of(Utc::now(), cancel)
    }

    /// Archival run with an explicit clock
    pub fn archive_as_of(&self, now: DateTime<Utc>, cancel: &CancelSignal) -> ArchiveOutcome {
        self.metrics.increment_archive_runs();

        let _guard = match self.begin_maintenance() {
            Some(guard) => guard,
            None => {
                self.metrics.increment_archive_runs_failed();
                return ArchiveOutcome::failed(
                    "Archival process failed: another archival or reconciliation run is in progress",
                );
            }
        };

        let cutoff = match self.config.cutoff(now) {
            Ok(cutoff) => cutoff,
            Err(e) => {
                let reason = e.to_string();
                Logger::emit(Event::ArchiveSelectionFailed, &[("reason", reason.as_str())]);
                self.metrics.increment_archive_runs_failed();
                return ArchiveOutcome::failed(format!("Archival process failed: {}", reason));
            }
        };
        let scope = ObservationScope::with_fields(
            "ARCHIVE_RUN",
            vec![
                ("cutoff", cutoff.to_rfc3339()),
                ("batch_size", self.config.batch_size.to_string()),
            ],
        );

        let selected = match self.primary.query_before(cutoff) {
            Ok(selected) => selected,
            Err(e) => {
                let reason = e.to_string();
                Logger::emit(Event::ArchiveSelectionFailed, &[("reason", reason.as_str())]);
                self.metrics.increment_archive_runs_failed();
                scope.fail(&reason);
                return ArchiveOutcome::failed(format!("Archival process failed: {}", reason));
            }
        };

        if selected.is_empty() {
            Logger::emit(Event::ArchiveNothingSelected, &[]);
            scope.complete_with_fields(&[("archived_count", "0")]);
            return ArchiveOutcome::nothing_selected();
        }

        let mut outcome = ArchiveOutcome {
            selected_count: selected.len() as u64,
            ..ArchiveOutcome::nothing_selected()
        };

        for (batch_no, batch) in selected.chunks(self.config.batch_size).enumerate() {
            let mut batch_archived = 0u64;
            for record in batch {
                if cancel.is_cancelled() {
                    let archived = outcome.archived_count.to_string();
                    Logger::emit(Event::ArchiveCancelled, &[("archived_count", archived.as_str())]);
                    self.metrics.increment_archive_runs_failed();
                    scope.fail("cancelled");
                    outcome.success = false;
                    outcome.message = format!(
                        "Archival cancelled after {} records",
                        outcome.archived_count
                    );
                    return outcome;
                }

                match self.archive_one(record, now) {
                    Ok(Migration::Archived) => {
                        outcome.archived_count += 1;
                        batch_archived += 1;
                    }
                    Ok(Migration::Skipped) => outcome.skipped_count += 1,
                    Err(_) => outcome.failed_count += 1,
                }
            }
            outcome.batches += 1;

            let batch_no = (batch_no + 1).to_string();
            let size = batch.len().to_string();
            let archived = batch_archived.to_string();
            Logger::emit(
                Event::ArchiveBatchComplete,
                &[
                    ("batch", batch_no.as_str()),
                    ("size", size.as_str()),
                    ("archived", archived.as_str()),
                ],
            );
        }

        outcome.message = format!("Successfully archived {} records", outcome.archived_count);
        let archived = outcome.archived_count.to_string();
        let failed = outcome.failed_count.to_string();
        scope.complete_with_fields(&[
            ("archived_count", archived.as_str()),
            ("failed_count", failed.as_str()),
        ]);
        outcome
    }

    /// Migrate one record. Failures are logged here and never propagate
    /// past the batch loop.
    fn archive_one(&self, record: &BillingRecord, now: DateTime<Utc>) -> TieringResult<Migration> {
        if !record.has_id() {
            Logger::emit(Event::RecordSkipped, &[("reason", "record has no id")]);
            self.metrics.increment_records_skipped();
            return Ok(Migration::Skipped);
        }

        let id = record.id.as_str();
        let path = canonical_cold_path(id);
        let fail = |step: &str, error: TieringError| {
            let reason = error.to_string();
            Logger::emit(
                Event::RecordArchiveFailed,
                &[("id", id), ("step", step), ("reason", reason.as_str())],
            );
            self.metrics.increment_records_failed();
            error
        };

        let blob = record.to_json_bytes().map_err(|e| {
            fail(
                "encode",
                TieringError::Corrupt {
                    path: path.clone(),
                    reason: e.to_string(),
                },
            )
        })?;

        self.cold
            .put(&path, &blob)
            .map_err(|e| fail("upload", e.into()))?;

        let entry = ArchiveIndexEntry::new(id, path.as_str(), now, record.created_at)
            .with_checksum_of(&blob);
        self.index
            .create(&entry)
            .map_err(|e| fail("index", TieringError::from_index(e)))?;

        self.primary
            .delete(id)
            .map_err(|e| fail("delete", TieringError::from_primary(e)))?;

        Logger::emit(Event::RecordArchived, &[("id", id), ("cold_path", path.as_str())]);
        self.metrics.increment_records_archived();
        Ok(Migration::Archived)
    }
}
