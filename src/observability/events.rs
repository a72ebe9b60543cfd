//! Observable events
//!
//! Every line the service logs names one of these. Each event carries the
//! severity it is normally logged at.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Service startup begins
    BootStart,
    /// Configuration loaded and validated
    ConfigLoaded,
    /// Configuration rejected (fatal)
    ConfigInvalid,
    /// HTTP listener bound
    Serving,
    /// Shutdown complete
    ShutdownComplete,

    // Storage
    /// Stored document could not be decoded and was left out of a scan
    DocumentUnreadable,

    // Archival
    /// Archival run found nothing older than the cutoff
    ArchiveNothingSelected,
    /// Selection query failed, run aborted
    ArchiveSelectionFailed,
    /// One batch finished
    ArchiveBatchComplete,
    /// Run stopped on request
    ArchiveCancelled,
    /// Background archival task panicked or was aborted
    ArchiveTaskFailed,
    /// Record fully migrated
    RecordArchived,
    /// Record had no id
    RecordSkipped,
    /// One migration step failed for a record
    RecordArchiveFailed,

    // Lookup
    /// Record found at a resolution step
    RecordResolved,
    /// Resolution step failed with a store error
    LookupStepFailed,
    /// Index pointed at a missing or unreadable blob
    IndexEntryStale,
    /// Record not found in any tier
    RecordNotFound,

    // Restore
    /// Record restored into the hot tier
    RestoreComplete,
    /// Restore refused or failed before the record went live
    RestoreFailed,
    /// Record live again, cold artifacts left behind
    RestoreCleanupIncomplete,

    // Reconciliation
    /// Orphaned cold copy of a live record removed
    OrphanBlobRemoved,
    /// Index entry without a blob removed
    StaleIndexEntryRemoved,
    /// Reconciliation could not repair one item
    ReconcileItemFailed,

    // Scheduler
    /// Next scheduled run computed
    ScheduleNextRun,
    /// Scheduled run could not be executed
    ScheduleRunFailed,

    // Stats
    /// Counts could not be collected
    StatsFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "BILLVAULT_STARTUP_BEGIN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ConfigInvalid => "CONFIG_INVALID",
            Event::Serving => "BILLVAULT_SERVING",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",

            Event::DocumentUnreadable => "DOCUMENT_UNREADABLE",

            Event::ArchiveNothingSelected => "ARCHIVE_NOTHING_SELECTED",
            Event::ArchiveSelectionFailed => "ARCHIVE_SELECTION_FAILED",
            Event::ArchiveBatchComplete => "ARCHIVE_BATCH_COMPLETE",
            Event::ArchiveCancelled => "ARCHIVE_CANCELLED",
            Event::ArchiveTaskFailed => "ARCHIVE_TASK_FAILED",
            Event::RecordArchived => "RECORD_ARCHIVED",
            Event::RecordSkipped => "RECORD_SKIPPED",
            Event::RecordArchiveFailed => "RECORD_ARCHIVE_FAILED",

            Event::RecordResolved => "RECORD_RESOLVED",
            Event::LookupStepFailed => "LOOKUP_STEP_FAILED",
            Event::IndexEntryStale => "INDEX_ENTRY_STALE",
            Event::RecordNotFound => "RECORD_NOT_FOUND",

            Event::RestoreComplete => "RESTORE_COMPLETE",
            Event::RestoreFailed => "RESTORE_FAILED",
            Event::RestoreCleanupIncomplete => "RESTORE_CLEANUP_INCOMPLETE",

            Event::OrphanBlobRemoved => "ORPHAN_BLOB_REMOVED",
            Event::StaleIndexEntryRemoved => "STALE_INDEX_ENTRY_REMOVED",
            Event::ReconcileItemFailed => "RECONCILE_ITEM_FAILED",

            Event::ScheduleNextRun => "SCHEDULE_NEXT_RUN",
            Event::ScheduleRunFailed => "SCHEDULE_RUN_FAILED",
            Event::StatsFailed => "STATS_FAILED",
        }
    }

    /// Severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::ConfigInvalid => Severity::Fatal,
            Event::ArchiveSelectionFailed
            | Event::RecordArchiveFailed
            | Event::RestoreFailed
            | Event::ReconcileItemFailed
            | Event::ScheduleRunFailed
            | Event::ArchiveTaskFailed
            | Event::StatsFailed => Severity::Error,
            Event::RecordSkipped
            | Event::DocumentUnreadable
            | Event::LookupStepFailed
            | Event::IndexEntryStale
            | Event::ArchiveCancelled
            | Event::RestoreCleanupIncomplete => Severity::Warn,
            Event::RecordResolved | Event::RecordNotFound => Severity::Trace,
            _ => Severity::Info,
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
