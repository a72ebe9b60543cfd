//! # Cold Store Trait

use super::errors::ColdStoreResult;

/// Object store holding archived records as opaque blobs
pub trait ColdStore: Send + Sync + std::fmt::Debug {
    /// Write `data` at `path`, replacing any existing object
    fn put(&self, path: &str, data: &[u8]) -> ColdStoreResult<()>;

    /// Read the object at `path`; `ObjectNotFound` when absent
    fn get(&self, path: &str) -> ColdStoreResult<Vec<u8>>;

    /// Remove the object at `path`; `ObjectNotFound` when absent
    fn delete(&self, path: &str) -> ColdStoreResult<()>;

    fn exists(&self, path: &str) -> ColdStoreResult<bool>;

    /// Every object path, optionally filtered by prefix, sorted
    fn list(&self, prefix: Option<&str>) -> ColdStoreResult<Vec<String>>;
}
