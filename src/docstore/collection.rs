//! # Document Collection
//!
//! A namespace of JSON documents keyed by id. Memory-backed for tests and
//! embedded use, directory-backed (`<root>/<namespace>/<id>.json`) for the
//! service. Each single-document operation is atomic on its own; nothing is
//! atomic across documents.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use super::errors::{DocStoreError, DocStoreResult};
use crate::observability::{Event, Logger};

const DOC_SUFFIX: &str = ".json";
const MAX_KEY_LEN: usize = 255;

#[derive(Debug)]
enum Backing {
    Memory(RwLock<BTreeMap<String, Value>>),
    Directory(PathBuf),
}

#[derive(Debug)]
pub struct DocumentCollection {
    namespace: String,
    backing: Backing,
}

impl DocumentCollection {
    pub fn in_memory(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            backing: Backing::Memory(RwLock::new(BTreeMap::new())),
        }
    }

    /// Open (creating if needed) `<root>/<namespace>`
    pub fn open(root: &Path, namespace: impl Into<String>) -> DocStoreResult<Self> {
        let namespace = namespace.into();
        let dir = root.join(&namespace);
        fs::create_dir_all(&dir)?;
        Ok(Self {
            namespace,
            backing: Backing::Directory(dir),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn get(&self, id: &str) -> DocStoreResult<Value> {
        validate_key(id)?;
        match &self.backing {
            Backing::Memory(docs) => docs
                .read()
                .map_err(|_| DocStoreError::poisoned())?
                .get(id)
                .cloned()
                .ok_or_else(|| DocStoreError::NotFound(id.to_string())),
            Backing::Directory(dir) => {
                let bytes = fs::read(doc_path(dir, id)).map_err(|e| not_found_or_io(e, id))?;
                Ok(serde_json::from_slice(&bytes)?)
            }
        }
    }

    pub fn get_as<T: DeserializeOwned>(&self, id: &str) -> DocStoreResult<T> {
        Ok(serde_json::from_value(self.get(id)?)?)
    }

    pub fn contains(&self, id: &str) -> DocStoreResult<bool> {
        validate_key(id)?;
        match &self.backing {
            Backing::Memory(docs) => Ok(docs
                .read()
                .map_err(|_| DocStoreError::poisoned())?
                .contains_key(id)),
            Backing::Directory(dir) => Ok(doc_path(dir, id).is_file()),
        }
    }

    /// Insert a new document; `AlreadyExists` if the id is taken
    pub fn insert(&self, id: &str, doc: &Value) -> DocStoreResult<()> {
        validate_key(id)?;
        match &self.backing {
            Backing::Memory(docs) => {
                let mut docs = docs.write().map_err(|_| DocStoreError::poisoned())?;
                if docs.contains_key(id) {
                    return Err(DocStoreError::AlreadyExists(id.to_string()));
                }
                docs.insert(id.to_string(), doc.clone());
                Ok(())
            }
            Backing::Directory(dir) => {
                let staged = stage(dir, id, doc)?;
                // hard_link refuses to overwrite, which makes the existence
                // check and the publish a single step.
                let linked = fs::hard_link(&staged, doc_path(dir, id));
                let _ = fs::remove_file(&staged);
                linked.map_err(|e| {
                    if e.kind() == ErrorKind::AlreadyExists {
                        DocStoreError::AlreadyExists(id.to_string())
                    } else {
                        DocStoreError::from(e)
                    }
                })
            }
        }
    }

    /// Insert or overwrite
    pub fn upsert(&self, id: &str, doc: &Value) -> DocStoreResult<()> {
        validate_key(id)?;
        match &self.backing {
            Backing::Memory(docs) => {
                docs.write()
                    .map_err(|_| DocStoreError::poisoned())?
                    .insert(id.to_string(), doc.clone());
                Ok(())
            }
            Backing::Directory(dir) => {
                let staged = stage(dir, id, doc)?;
                fs::rename(&staged, doc_path(dir, id)).map_err(|e| {
                    let _ = fs::remove_file(&staged);
                    DocStoreError::from(e)
                })
            }
        }
    }

    /// Overwrite an existing document; `NotFound` if absent
    pub fn replace(&self, id: &str, doc: &Value) -> DocStoreResult<()> {
        validate_key(id)?;
        match &self.backing {
            Backing::Memory(docs) => {
                let mut docs = docs.write().map_err(|_| DocStoreError::poisoned())?;
                match docs.get_mut(id) {
                    Some(existing) => {
                        *existing = doc.clone();
                        Ok(())
                    }
                    None => Err(DocStoreError::NotFound(id.to_string())),
                }
            }
            Backing::Directory(dir) => {
                if !doc_path(dir, id).is_file() {
                    return Err(DocStoreError::NotFound(id.to_string()));
                }
                self.upsert(id, doc)
            }
        }
    }

    pub fn remove(&self, id: &str) -> DocStoreResult<()> {
        validate_key(id)?;
        match &self.backing {
            Backing::Memory(docs) => docs
                .write()
                .map_err(|_| DocStoreError::poisoned())?
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| DocStoreError::NotFound(id.to_string())),
            Backing::Directory(dir) => {
                fs::remove_file(doc_path(dir, id)).map_err(|e| not_found_or_io(e, id))
            }
        }
    }

    /// Every readable document, ordered by id
    ///
    /// Unreadable documents are logged and left out; a document removed
    /// while the scan runs is silently skipped.
    pub fn scan(&self) -> DocStoreResult<Vec<(String, Value)>> {
        match &self.backing {
            Backing::Memory(docs) => Ok(docs
                .read()
                .map_err(|_| DocStoreError::poisoned())?
                .iter()
                .map(|(id, doc)| (id.clone(), doc.clone()))
                .collect()),
            Backing::Directory(dir) => {
                let mut docs = Vec::new();
                for id in self.directory_ids(dir)? {
                    let bytes = match fs::read(doc_path(dir, &id)) {
                        Ok(bytes) => bytes,
                        Err(e) if e.kind() == ErrorKind::NotFound => continue,
                        Err(e) => return Err(e.into()),
                    };
                    match serde_json::from_slice(&bytes) {
                        Ok(doc) => docs.push((id, doc)),
                        Err(e) => {
                            let reason = e.to_string();
                            Logger::emit(
                                Event::DocumentUnreadable,
                                &[
                                    ("namespace", self.namespace.as_str()),
                                    ("id", id.as_str()),
                                    ("reason", reason.as_str()),
                                ],
                            );
                        }
                    }
                }
                Ok(docs)
            }
        }
    }

    pub fn ids(&self) -> DocStoreResult<Vec<String>> {
        match &self.backing {
            Backing::Memory(docs) => Ok(docs
                .read()
                .map_err(|_| DocStoreError::poisoned())?
                .keys()
                .cloned()
                .collect()),
            Backing::Directory(dir) => self.directory_ids(dir),
        }
    }

    pub fn count(&self) -> DocStoreResult<u64> {
        Ok(self.ids()?.len() as u64)
    }

    fn directory_ids(&self, dir: &Path) -> DocStoreResult<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with('.') {
                continue;
            }
            if let Some(id) = name.strip_suffix(DOC_SUFFIX) {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

fn doc_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{}{}", id, DOC_SUFFIX))
}

/// Write `doc` to a hidden temp file next to its final location
fn stage(dir: &Path, id: &str, doc: &Value) -> DocStoreResult<PathBuf> {
    let bytes = serde_json::to_vec(doc)?;
    let staged = dir.join(format!(".{}.{}.tmp", id, Uuid::new_v4()));
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&staged)?;
    let written = file.write_all(&bytes).and_then(|_| file.sync_all());
    if let Err(e) = written {
        let _ = fs::remove_file(&staged);
        return Err(e.into());
    }
    Ok(staged)
}

fn not_found_or_io(e: std::io::Error, id: &str) -> DocStoreError {
    if e.kind() == ErrorKind::NotFound {
        DocStoreError::NotFound(id.to_string())
    } else {
        DocStoreError::from(e)
    }
}

/// Whether `id` can be stored as a document key at all
pub fn validate_key(id: &str) -> DocStoreResult<()> {
    let bad = id.is_empty()
        || id.len() > MAX_KEY_LEN
        || id.starts_with('.')
        || id.contains(['/', '\\', '\0']);
    if bad {
        return Err(DocStoreError::InvalidKey(id.to_string()));
    }
    Ok(())
}
