//! # Archive Index Module
//!
//! Tracks where each migrated record physically lives so lookups never
//! have to search the cold tier blindly.

pub mod entry;
pub mod index;

pub use entry::{blob_checksum, ArchiveIndexEntry};
pub use index::{ArchiveIndex, CollectionArchiveIndex, INDEX_NAMESPACE};
