//! # Operation Outcomes

use serde::{Deserialize, Serialize};

use crate::billing::BillingRecord;

/// Result of one archival run
///
/// `success` is false only when selection failed or the run was cancelled;
/// per-record failures show up in `failed_count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveOutcome {
    pub success: bool,
    pub archived_count: u64,
    pub message: String,
    #[serde(default)]
    pub selected_count: u64,
    #[serde(default)]
    pub failed_count: u64,
    #[serde(default)]
    pub skipped_count: u64,
    #[serde(default)]
    pub batches: u64,
}

impl ArchiveOutcome {
    pub(crate) fn nothing_selected() -> Self {
        Self {
            success: true,
            archived_count: 0,
            message: "No records found for archival".into(),
            selected_count: 0,
            failed_count: 0,
            skipped_count: 0,
            batches: 0,
        }
    }

    pub(crate) fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Self::nothing_selected()
        }
    }

    /// Accepted for background execution; counts are not known yet
    pub fn started() -> Self {
        Self {
            message: "Archival process started in background".into(),
            ..Self::nothing_selected()
        }
    }
}

/// Which resolution step produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Primary,
    ArchiveIndex,
    ColdFallback,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Primary => "primary",
            Tier::ArchiveIndex => "archive_index",
            Tier::ColdFallback => "cold_fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRecord {
    pub record: BillingRecord,
    pub source: Tier,
}

/// Result of a reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    /// Cold blobs removed because the record is live in the hot tier
    pub orphan_blobs_removed: u64,
    /// Index entries removed along with those blobs, or because their blob was gone
    pub stale_entries_removed: u64,
    pub failed_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(Tier::ColdFallback).unwrap(),
            serde_json::json!("cold_fallback")
        );
        assert_eq!(Tier::ArchiveIndex.as_str(), "archive_index");
    }

    #[test]
    fn test_failed_outcome() {
        let outcome = ArchiveOutcome::failed("boom");
        assert!(!outcome.success);
        assert_eq!(outcome.archived_count, 0);
        assert_eq!(outcome.message, "boom");
    }
}
