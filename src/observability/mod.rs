//! Observability for billvault
//!
//! - Structured JSON logging with typed events
//! - Atomic counters for archival, lookup and restore
//! - Begin/complete scopes around archival and reconciliation runs
//!
//! Observability never fails an operation: write errors on the log
//! streams are swallowed.
//!
//! # Usage
//!
//! ```ignore
//! use billvault::observability::{Event, Logger, ObservationScope};
//!
//! Logger::emit(Event::RecordArchived, &[("id", "inv-42")]);
//!
//! let scope = ObservationScope::new("ARCHIVE_RUN");
//! // ... migrate records ...
//! scope.complete_with_fields(&[("archived", "42")]);
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsSnapshot, TieringMetrics};
pub use scope::ObservationScope;
