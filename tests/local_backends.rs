//! Directory-Backed Store Tests
//!
//! Full archive/lookup/restore cycle over the on-disk stores, including
//! reopening the stores between steps.

use std::path::Path;
use std::sync::Arc;

use billvault::archive_index::{ArchiveIndex, CollectionArchiveIndex};
use billvault::billing::BillingRecord;
use billvault::cold_storage::{ColdStore, LocalColdStore};
use billvault::primary::{CollectionPrimaryStore, PrimaryStore};
use billvault::tiering::{Tier, TieringConfig, TieringEngine};
use chrono::{Duration, Utc};
use tempfile::TempDir;

fn open_engine(root: &Path) -> TieringEngine {
    let hot = root.join("hot");
    TieringEngine::new(
        Arc::new(CollectionPrimaryStore::open(&hot).unwrap()),
        Arc::new(LocalColdStore::open(root.join("cold")).unwrap()),
        Arc::new(CollectionArchiveIndex::open(&hot).unwrap()),
        TieringConfig::new(90, 2),
    )
    .unwrap()
}

fn record(id: &str, days_old: i64) -> BillingRecord {
    let mut record = BillingRecord::new(id, "cust-7", 42.5, 30);
    record.created_at = Utc::now() - Duration::days(days_old);
    record
}

// =============================================================================
// Cycle
// =============================================================================

#[test]
fn test_archive_and_restore_on_disk() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(dir.path());

    let old = record("inv-old", 365);
    engine.primary().create(&old).unwrap();
    engine.primary().create(&record("inv-new", 3)).unwrap();

    let outcome = engine.archive_old_records();
    assert!(outcome.success);
    assert_eq!(outcome.archived_count, 1);
    assert!(dir.path().join("cold").join("inv-old.json").exists());

    let resolved = engine.resolve_record("inv-old").unwrap();
    assert_eq!(resolved.source, Tier::ArchiveIndex);
    assert_eq!(resolved.record, old);

    assert!(engine.restore_record("inv-old"));
    assert!(!dir.path().join("cold").join("inv-old.json").exists());
    assert_eq!(engine.resolve_record("inv-old").unwrap().source, Tier::Primary);
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_archive_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let old = record("inv-1", 200);
    {
        let engine = open_engine(dir.path());
        engine.primary().create(&old).unwrap();
        assert_eq!(engine.archive_old_records().archived_count, 1);
    }

    let engine = open_engine(dir.path());
    assert_eq!(engine.index().count().unwrap(), 1);
    assert_eq!(engine.primary().count().unwrap(), 0);
    assert_eq!(engine.get_record("inv-1").unwrap(), old);

    let stats = engine.get_stats();
    assert!(!stats.is_error());
}

#[test]
fn test_canonical_blob_found_after_index_loss() {
    let dir = TempDir::new().unwrap();
    let old = record("inv-1", 200);
    {
        let engine = open_engine(dir.path());
        engine.primary().create(&old).unwrap();
        engine.archive_old_records();
        engine.index().delete("inv-1").unwrap();
    }

    let engine = open_engine(dir.path());
    let resolved = engine.resolve_record("inv-1").unwrap();
    assert_eq!(resolved.source, Tier::ColdFallback);
    assert_eq!(resolved.record, old);
}

#[test]
fn test_batches_cover_every_aged_record() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(dir.path());
    for i in 0..5 {
        engine.primary().create(&record(&format!("inv-{}", i), 100 + i)).unwrap();
    }

    let outcome = engine.archive_old_records();
    assert_eq!(outcome.archived_count, 5);
    assert_eq!(outcome.batches, 3);

    let mut blobs = engine.cold().list(None).unwrap();
    blobs.sort();
    assert_eq!(
        blobs,
        vec!["inv-0.json", "inv-1.json", "inv-2.json", "inv-3.json", "inv-4.json"]
    );
}
