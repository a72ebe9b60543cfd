//! # Archive Index
//!
//! Record id → cold-tier location. Lives on the same document engine as the
//! hot tier, in its own namespace.

use std::path::Path;

use super::entry::ArchiveIndexEntry;
use crate::docstore::{DocStoreError, DocStoreResult, DocumentCollection};

/// Namespace holding index entries
pub const INDEX_NAMESPACE: &str = "archive_index";

pub trait ArchiveIndex: Send + Sync + std::fmt::Debug {
    fn get(&self, id: &str) -> DocStoreResult<ArchiveIndexEntry>;

    /// Record a migration. An entry left by an earlier, incomplete
    /// migration of the same id is replaced.
    fn create(&self, entry: &ArchiveIndexEntry) -> DocStoreResult<()>;

    fn delete(&self, id: &str) -> DocStoreResult<()>;

    fn count(&self) -> DocStoreResult<u64>;

    /// Every entry, ordered by id
    fn list(&self) -> DocStoreResult<Vec<ArchiveIndexEntry>>;
}

#[derive(Debug)]
pub struct CollectionArchiveIndex {
    entries: DocumentCollection,
}

impl CollectionArchiveIndex {
    pub fn new(entries: DocumentCollection) -> Self {
        Self { entries }
    }

    pub fn in_memory() -> Self {
        Self::new(DocumentCollection::in_memory(INDEX_NAMESPACE))
    }

    pub fn open(root: &Path) -> DocStoreResult<Self> {
        Ok(Self::new(DocumentCollection::open(root, INDEX_NAMESPACE)?))
    }
}

impl ArchiveIndex for CollectionArchiveIndex {
    fn get(&self, id: &str) -> DocStoreResult<ArchiveIndexEntry> {
        self.entries.get_as(id)
    }

    fn create(&self, entry: &ArchiveIndexEntry) -> DocStoreResult<()> {
        let doc = serde_json::to_value(entry).map_err(DocStoreError::from)?;
        self.entries.upsert(&entry.id, &doc)
    }

    fn delete(&self, id: &str) -> DocStoreResult<()> {
        self.entries.remove(id)
    }

    fn count(&self) -> DocStoreResult<u64> {
        self.entries.count()
    }

    fn list(&self) -> DocStoreResult<Vec<ArchiveIndexEntry>> {
        self.entries
            .scan()?
            .into_iter()
            .map(|(_, doc)| serde_json::from_value(doc).map_err(DocStoreError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn entry(id: &str) -> ArchiveIndexEntry {
        let now = Utc::now();
        ArchiveIndexEntry::new(id, format!("{}.json", id), now, now)
    }

    #[test]
    fn test_create_get_delete() {
        let index = CollectionArchiveIndex::in_memory();
        index.create(&entry("inv-1")).unwrap();
        assert_eq!(index.get("inv-1").unwrap().cold_path, "inv-1.json");
        assert_eq!(index.count().unwrap(), 1);

        index.delete("inv-1").unwrap();
        assert!(index.get("inv-1").unwrap_err().is_not_found());
        assert!(index.delete("inv-1").unwrap_err().is_not_found());
    }

    #[test]
    fn test_create_replaces_leftover_entry() {
        let index = CollectionArchiveIndex::in_memory();
        index.create(&entry("inv-1")).unwrap();
        let mut again = entry("inv-1");
        again.cold_path = "moved/inv-1.json".into();
        index.create(&again).unwrap();
        assert_eq!(index.get("inv-1").unwrap().cold_path, "moved/inv-1.json");
        assert_eq!(index.count().unwrap(), 1);
    }

    #[test]
    fn test_list_from_directory() {
        let temp = TempDir::new().unwrap();
        let index = CollectionArchiveIndex::open(temp.path()).unwrap();
        index.create(&entry("b")).unwrap();
        index.create(&entry("a")).unwrap();
        let ids: Vec<String> = index.list().unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
