//! # Archive Index Entry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Where an archived record lives in the cold tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveIndexEntry {
    /// Record id
    pub id: String,
    /// Opaque cold-tier location
    pub cold_path: String,
    pub archived_at: DateTime<Utc>,
    /// Copied from the record at migration time
    pub original_created_at: DateTime<Utc>,
    /// SHA-256 hex of the uploaded blob; absent on entries from older writers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl ArchiveIndexEntry {
    pub fn new(
        id: impl Into<String>,
        cold_path: impl Into<String>,
        archived_at: DateTime<Utc>,
        original_created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            cold_path: cold_path.into(),
            archived_at,
            original_created_at,
            checksum: None,
        }
    }

    pub fn with_checksum_of(mut self, blob: &[u8]) -> Self {
        self.checksum = Some(blob_checksum(blob));
        self
    }

    /// True when no checksum was recorded or `blob` matches it
    pub fn matches_blob(&self, blob: &[u8]) -> bool {
        match &self.checksum {
            Some(expected) => *expected == blob_checksum(blob),
            None => true,
        }
    }
}

pub fn blob_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_detects_changed_blob() {
        let now = Utc::now();
        let entry = ArchiveIndexEntry::new("inv-1", "inv-1.json", now, now).with_checksum_of(b"{}");
        assert!(entry.matches_blob(b"{}"));
        assert!(!entry.matches_blob(b"{\"x\":1}"));
    }

    #[test]
    fn test_entry_without_checksum_accepts_any_blob() {
        let now = Utc::now();
        let entry = ArchiveIndexEntry::new("inv-1", "inv-1.json", now, now);
        assert!(entry.matches_blob(b"anything"));
    }

    #[test]
    fn test_legacy_entry_decodes() {
        let entry: ArchiveIndexEntry = serde_json::from_value(serde_json::json!({
            "id": "inv-1",
            "cold_path": "inv-1.json",
            "archived_at": "2024-06-01T00:00:00Z",
            "original_created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(entry.checksum.is_none());
    }

    #[test]
    fn test_checksum_is_hex_sha256() {
        let sum = blob_checksum(b"abc");
        assert_eq!(
            sum,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
