//! # Collection-backed Primary Store

use std::path::Path;

use chrono::{DateTime, Utc};

use super::store::PrimaryStore;
use crate::billing::{BillingPatch, BillingRecord};
use crate::docstore::{DocStoreError, DocStoreResult, DocumentCollection};
use crate::observability::{Event, Logger};

/// Namespace holding live records
pub const RECORDS_NAMESPACE: &str = "records";

#[derive(Debug)]
pub struct CollectionPrimaryStore {
    records: DocumentCollection,
}

impl CollectionPrimaryStore {
    pub fn new(records: DocumentCollection) -> Self {
        Self { records }
    }

    pub fn in_memory() -> Self {
        Self::new(DocumentCollection::in_memory(RECORDS_NAMESPACE))
    }

    pub fn open(root: &Path) -> DocStoreResult<Self> {
        Ok(Self::new(DocumentCollection::open(root, RECORDS_NAMESPACE)?))
    }

    fn encode(record: &BillingRecord) -> DocStoreResult<serde_json::Value> {
        record
            .to_document()
            .map_err(|e| DocStoreError::Serialization(e.to_string()))
    }
}

impl PrimaryStore for CollectionPrimaryStore {
    fn get(&self, id: &str) -> DocStoreResult<BillingRecord> {
        let doc = self.records.get(id)?;
        BillingRecord::from_document(doc).map_err(|e| DocStoreError::Serialization(e.to_string()))
    }

    fn create(&self, record: &BillingRecord) -> DocStoreResult<()> {
        self.records.insert(&record.id, &Self::encode(record)?)
    }

    fn update(&self, id: &str, patch: &BillingPatch) -> DocStoreResult<BillingRecord> {
        let mut record = self.get(id)?;
        patch.apply(&mut record);
        self.records.replace(id, &Self::encode(&record)?)?;
        Ok(record)
    }

    fn delete(&self, id: &str) -> DocStoreResult<()> {
        self.records.remove(id)
    }

    fn query_before(&self, cutoff: DateTime<Utc>) -> DocStoreResult<Vec<BillingRecord>> {
        let mut selected = Vec::new();
        for (key, doc) in self.records.scan()? {
            match BillingRecord::from_document(doc) {
                Ok(record) if record.is_older_than(cutoff) => selected.push(record),
                Ok(_) => {}
                Err(e) => {
                    let reason = e.to_string();
                    Logger::emit(
                        Event::DocumentUnreadable,
                        &[
                            ("namespace", self.records.namespace()),
                            ("id", key.as_str()),
                            ("reason", reason.as_str()),
                        ],
                    );
                }
            }
        }
        selected.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(selected)
    }

    fn count(&self) -> DocStoreResult<u64> {
        self.records.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn aged(id: &str, days_old: i64) -> BillingRecord {
        let mut record = BillingRecord::new(id, "cust-1", 12.5, 30);
        record.created_at = Utc::now() - Duration::days(days_old);
        record
    }

    #[test]
    fn test_create_get_delete() {
        let store = CollectionPrimaryStore::in_memory();
        let record = aged("inv-1", 1);
        store.create(&record).unwrap();
        assert_eq!(store.get("inv-1").unwrap(), record);

        store.delete("inv-1").unwrap();
        assert!(store.get("inv-1").unwrap_err().is_not_found());
    }

    #[test]
    fn test_create_duplicate_rejected() {
        let store = CollectionPrimaryStore::in_memory();
        store.create(&aged("inv-1", 1)).unwrap();
        assert!(store.create(&aged("inv-1", 2)).unwrap_err().is_already_exists());
    }

    #[test]
    fn test_update_applies_patch() {
        let store = CollectionPrimaryStore::in_memory();
        store.create(&aged("inv-1", 1)).unwrap();
        let patch = BillingPatch {
            amount: Some(99.0),
            ..Default::default()
        };
        let updated = store.update("inv-1", &patch).unwrap();
        assert_eq!(updated.amount, 99.0);
        assert_eq!(store.get("inv-1").unwrap().amount, 99.0);
        assert!(store.update("missing", &patch).unwrap_err().is_not_found());
    }

    #[test]
    fn test_query_before_selects_strictly_older_oldest_first() {
        let store = CollectionPrimaryStore::in_memory();
        store.create(&aged("young", 10)).unwrap();
        store.create(&aged("old", 100)).unwrap();
        store.create(&aged("older", 200)).unwrap();

        let cutoff = Utc::now() - Duration::days(90);
        let ids: Vec<String> = store
            .query_before(cutoff)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["older", "old"]);
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn test_query_before_skips_undecodable_documents() {
        let records = DocumentCollection::in_memory(RECORDS_NAMESPACE);
        records.insert("junk", &json!({"id": "junk", "amount": "lots"})).unwrap();
        let store = CollectionPrimaryStore::new(records);
        store.create(&aged("old", 100)).unwrap();

        let selected = store.query_before(Utc::now()).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, "old");
    }
}
