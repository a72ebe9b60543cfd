//! # Primary Store (hot tier)
//!
//! Key-addressed CRUD over live billing records plus the creation-time
//! query that feeds archival.

pub mod collection;
pub mod store;

pub use collection::{CollectionPrimaryStore, RECORDS_NAMESPACE};
pub use store::PrimaryStore;
