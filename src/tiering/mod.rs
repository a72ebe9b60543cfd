//! # Tiering Module
//!
//! Moves billing records between the hot and cold tiers and resolves them
//! wherever they live.
//!
//! ## Invariants
//!
//! - Per-record failures never abort an archival run
//! - A record is readable throughout migration: hot copy, indexed blob or
//!   canonical blob
//! - Restore reports success once the record is live in the hot tier

pub mod archive;
pub mod cancel;
pub mod config;
pub mod engine;
pub mod errors;
pub mod outcome;
pub mod restore;
pub mod scheduler;
pub mod stats;

pub use cancel::CancelSignal;
pub use config::TieringConfig;
pub use engine::{canonical_cold_path, TieringEngine};
pub use errors::{StoreKind, TieringError, TieringResult};
pub use outcome::{ArchiveOutcome, ReconcileOutcome, ResolvedRecord, Tier};
pub use scheduler::{ArchiveSchedule, ArchiveScheduler};
pub use stats::{StatsReport, StatsReporter, StatsSnapshot};
