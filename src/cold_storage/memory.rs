//! # In-memory Cold Store

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::backend::ColdStore;
use super::errors::{ColdStoreError, ColdStoreResult};

#[derive(Debug, Default)]
pub struct MemoryColdStore {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryColdStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> ColdStoreError {
    ColdStoreError::Internal("Lock poisoned".into())
}

impl ColdStore for MemoryColdStore {
    fn put(&self, path: &str, data: &[u8]) -> ColdStoreResult<()> {
        if path.is_empty() {
            return Err(ColdStoreError::InvalidPath(path.to_string()));
        }
        let mut objects = self.objects.write().map_err(|_| poisoned())?;
        objects.insert(path.to_string(), data.to_vec());
        Ok(())
    }

    fn get(&self, path: &str) -> ColdStoreResult<Vec<u8>> {
        let objects = self.objects.read().map_err(|_| poisoned())?;
        objects
            .get(path)
            .cloned()
            .ok_or_else(|| ColdStoreError::ObjectNotFound(path.to_string()))
    }

    fn delete(&self, path: &str) -> ColdStoreResult<()> {
        let mut objects = self.objects.write().map_err(|_| poisoned())?;
        objects
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| ColdStoreError::ObjectNotFound(path.to_string()))
    }

    fn exists(&self, path: &str) -> ColdStoreResult<bool> {
        let objects = self.objects.read().map_err(|_| poisoned())?;
        Ok(objects.contains_key(path))
    }

    fn list(&self, prefix: Option<&str>) -> ColdStoreResult<Vec<String>> {
        let objects = self.objects.read().map_err(|_| poisoned())?;
        Ok(objects
            .keys()
            .filter(|path| prefix.map_or(true, |p| path.starts_with(p)))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_overwrites() {
        let store = MemoryColdStore::new();
        store.put("inv-1.json", b"one").unwrap();
        store.put("inv-1.json", b"two").unwrap();
        assert_eq!(store.get("inv-1.json").unwrap(), b"two");
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let store = MemoryColdStore::new();
        assert!(store.delete("nope.json").unwrap_err().is_not_found());
        assert!(!store.exists("nope.json").unwrap());
    }

    #[test]
    fn test_list_with_prefix() {
        let store = MemoryColdStore::new();
        store.put("inv-2.json", b"b").unwrap();
        store.put("inv-1.json", b"a").unwrap();
        store.put("credit-1.json", b"c").unwrap();
        assert_eq!(store.list(Some("inv-")).unwrap(), vec!["inv-1.json", "inv-2.json"]);
        assert_eq!(store.list(None).unwrap().len(), 3);
    }
}
