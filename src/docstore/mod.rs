//! # Document Store
//!
//! Namespaced JSON document engine underneath the hot tier and the archive
//! index. Both live on the same engine in separate namespaces.

pub mod collection;
pub mod errors;

pub use collection::{validate_key, DocumentCollection};
pub use errors::{DocStoreError, DocStoreResult};
