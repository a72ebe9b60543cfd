//! Shared fixtures for integration tests
//!
//! Fault-injecting wrappers around the in-process stores. A fault is an
//! (operation, key) pair; key `*` matches every key.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use billvault::archive_index::{ArchiveIndex, ArchiveIndexEntry, CollectionArchiveIndex};
use billvault::billing::{BillingPatch, BillingRecord};
use billvault::cold_storage::{ColdStore, ColdStoreError, ColdStoreResult, MemoryColdStore};
use billvault::docstore::{DocStoreError, DocStoreResult};
use billvault::primary::{CollectionPrimaryStore, PrimaryStore};
use billvault::tiering::{TieringConfig, TieringEngine};
use chrono::{DateTime, Duration, Utc};

pub const ANY: &str = "*";

#[derive(Debug, Default)]
pub struct Faults {
    rules: Mutex<HashSet<(String, String)>>,
}

impl Faults {
    pub fn fail(&self, op: &str, key: &str) {
        self.rules
            .lock()
            .unwrap()
            .insert((op.to_string(), key.to_string()));
    }

    pub fn heal(&self) {
        self.rules.lock().unwrap().clear();
    }

    fn tripped(&self, op: &str, key: &str) -> bool {
        let rules = self.rules.lock().unwrap();
        rules.contains(&(op.to_string(), key.to_string()))
            || rules.contains(&(op.to_string(), ANY.to_string()))
    }
}

// =============================================================================
// Primary
// =============================================================================

#[derive(Debug)]
pub struct FaultyPrimary {
    inner: CollectionPrimaryStore,
    faults: Arc<Faults>,
}

impl FaultyPrimary {
    fn check(&self, op: &str, key: &str) -> DocStoreResult<()> {
        if self.faults.tripped(op, key) {
            return Err(DocStoreError::Unavailable(format!("injected {} failure for {}", op, key)));
        }
        Ok(())
    }
}

impl PrimaryStore for FaultyPrimary {
    fn get(&self, id: &str) -> DocStoreResult<BillingRecord> {
        self.check("get", id)?;
        self.inner.get(id)
    }

    fn create(&self, record: &BillingRecord) -> DocStoreResult<()> {
        self.check("create", &record.id)?;
        self.inner.create(record)
    }

    fn update(&self, id: &str, patch: &BillingPatch) -> DocStoreResult<BillingRecord> {
        self.check("update", id)?;
        self.inner.update(id, patch)
    }

    fn delete(&self, id: &str) -> DocStoreResult<()> {
        self.check("delete", id)?;
        self.inner.delete(id)
    }

    fn query_before(&self, cutoff: DateTime<Utc>) -> DocStoreResult<Vec<BillingRecord>> {
        self.check("query", ANY)?;
        self.inner.query_before(cutoff)
    }

    fn count(&self) -> DocStoreResult<u64> {
        self.check("count", ANY)?;
        self.inner.count()
    }
}

// =============================================================================
// Archive index
// =============================================================================

#[derive(Debug)]
pub struct FaultyIndex {
    inner: CollectionArchiveIndex,
    faults: Arc<Faults>,
}

impl FaultyIndex {
    fn check(&self, op: &str, key: &str) -> DocStoreResult<()> {
        if self.faults.tripped(op, key) {
            return Err(DocStoreError::Unavailable(format!("injected {} failure for {}", op, key)));
        }
        Ok(())
    }
}

impl ArchiveIndex for FaultyIndex {
    fn get(&self, id: &str) -> DocStoreResult<ArchiveIndexEntry> {
        self.check("get", id)?;
        self.inner.get(id)
    }

    fn create(&self, entry: &ArchiveIndexEntry) -> DocStoreResult<()> {
        self.check("create", &entry.id)?;
        self.inner.create(entry)
    }

    fn delete(&self, id: &str) -> DocStoreResult<()> {
        self.check("delete", id)?;
        self.inner.delete(id)
    }

    fn count(&self) -> DocStoreResult<u64> {
        self.check("count", ANY)?;
        self.inner.count()
    }

    fn list(&self) -> DocStoreResult<Vec<ArchiveIndexEntry>> {
        self.check("list", ANY)?;
        self.inner.list()
    }
}

// =============================================================================
// Cold store
// =============================================================================

#[derive(Debug)]
pub struct FaultyCold {
    inner: MemoryColdStore,
    faults: Arc<Faults>,
}

impl FaultyCold {
    fn check(&self, op: &str, path: &str) -> ColdStoreResult<()> {
        if self.faults.tripped(op, path) {
            return Err(ColdStoreError::Unavailable(format!("injected {} failure for {}", op, path)));
        }
        Ok(())
    }
}

impl ColdStore for FaultyCold {
    fn put(&self, path: &str, data: &[u8]) -> ColdStoreResult<()> {
        self.check("put", path)?;
        self.inner.put(path, data)
    }

    fn get(&self, path: &str) -> ColdStoreResult<Vec<u8>> {
        self.check("get", path)?;
        self.inner.get(path)
    }

    fn delete(&self, path: &str) -> ColdStoreResult<()> {
        self.check("delete", path)?;
        self.inner.delete(path)
    }

    fn exists(&self, path: &str) -> ColdStoreResult<bool> {
        self.check("exists", path)?;
        self.inner.exists(path)
    }

    fn list(&self, prefix: Option<&str>) -> ColdStoreResult<Vec<String>> {
        self.check("list", ANY)?;
        self.inner.list(prefix)
    }
}

// =============================================================================
// Harness
// =============================================================================

/// Engine over fault-injecting stores, with direct handles to each store
pub struct Harness {
    pub engine: TieringEngine,
    pub primary: Arc<FaultyPrimary>,
    pub index: Arc<FaultyIndex>,
    pub cold: Arc<FaultyCold>,
    pub primary_faults: Arc<Faults>,
    pub index_faults: Arc<Faults>,
    pub cold_faults: Arc<Faults>,
}

impl Harness {
    pub fn new(age_threshold_days: u32, batch_size: usize) -> Self {
        let primary_faults = Arc::new(Faults::default());
        let index_faults = Arc::new(Faults::default());
        let cold_faults = Arc::new(Faults::default());

        let primary = Arc::new(FaultyPrimary {
            inner: CollectionPrimaryStore::in_memory(),
            faults: Arc::clone(&primary_faults),
        });
        let index = Arc::new(FaultyIndex {
            inner: CollectionArchiveIndex::in_memory(),
            faults: Arc::clone(&index_faults),
        });
        let cold = Arc::new(FaultyCold {
            inner: MemoryColdStore::new(),
            faults: Arc::clone(&cold_faults),
        });

        let engine = TieringEngine::new(
            primary.clone(),
            cold.clone(),
            index.clone(),
            TieringConfig::new(age_threshold_days, batch_size),
        )
        .unwrap();

        Self {
            engine,
            primary,
            index,
            cold,
            primary_faults,
            index_faults,
            cold_faults,
        }
    }

    pub fn heal(&self) {
        self.primary_faults.heal();
        self.index_faults.heal();
        self.cold_faults.heal();
    }

    /// Insert a record created `days_old` days ago
    pub fn seed(&self, id: &str, days_old: i64) -> BillingRecord {
        let record = aged_record(id, days_old);
        self.primary.create(&record).unwrap();
        record
    }

    pub fn in_primary(&self, id: &str) -> bool {
        self.primary.inner.get(id).is_ok()
    }

    pub fn in_index(&self, id: &str) -> bool {
        self.index.inner.get(id).is_ok()
    }

    pub fn in_cold(&self, path: &str) -> bool {
        self.cold.inner.exists(path).unwrap()
    }
}

pub fn aged_record(id: &str, days_old: i64) -> BillingRecord {
    let mut record = BillingRecord::new(id, "cust-1", 100.0, 30);
    record.created_at = Utc::now() - Duration::days(days_old);
    record.description = Some(format!("invoice {}", id));
    record
}
