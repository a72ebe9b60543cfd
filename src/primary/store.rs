//! # Primary Store Trait

use chrono::{DateTime, Utc};

use crate::billing::{BillingPatch, BillingRecord};
use crate::docstore::DocStoreResult;

/// Hot-tier record store
///
/// Every call may be a network round trip; callers hold no locks across
/// them. Implementations guarantee per-key atomicity only.
pub trait PrimaryStore: Send + Sync + std::fmt::Debug {
    /// Fetch by id; `NotFound` when absent
    fn get(&self, id: &str) -> DocStoreResult<BillingRecord>;

    /// Insert a new record; `AlreadyExists` when the id is live
    fn create(&self, record: &BillingRecord) -> DocStoreResult<()>;

    /// Merge a validated patch and return the stored result
    fn update(&self, id: &str, patch: &BillingPatch) -> DocStoreResult<BillingRecord>;

    /// Remove by id; `NotFound` when absent
    fn delete(&self, id: &str) -> DocStoreResult<()>;

    /// All records with `created_at` strictly before `cutoff`, oldest first
    fn query_before(&self, cutoff: DateTime<Utc>) -> DocStoreResult<Vec<BillingRecord>>;

    fn count(&self) -> DocStoreResult<u64>;
}
