//! # Billing Data Model
//!
//! Billing records, the typed partial-update patch, and the timestamp
//! formats accepted on input.

pub mod errors;
pub mod patch;
pub mod record;
pub mod timestamp;

pub use errors::{ValidationError, ValidationResult};
pub use patch::BillingPatch;
pub use record::{BillingRecord, BillingStatus};
pub use timestamp::parse_timestamp;
