//! # Cold Storage Module
//!
//! Cheap, slow object storage for archived records. Objects are opaque
//! byte blobs addressed by path.

pub mod backend;
pub mod errors;
pub mod local;
pub mod memory;

pub use backend::ColdStore;
pub use errors::{ColdStoreError, ColdStoreResult};
pub use local::LocalColdStore;
pub use memory::MemoryColdStore;
