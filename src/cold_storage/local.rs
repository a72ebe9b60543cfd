//! # Local Filesystem Cold Store

use std::fs;
use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

use super::backend::ColdStore;
use super::errors::{ColdStoreError, ColdStoreResult};

/// Cold store rooted at a directory; object paths map to relative file paths
#[derive(Debug)]
pub struct LocalColdStore {
    root: PathBuf,
}

impl LocalColdStore {
    /// Open a store at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> ColdStoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| ColdStoreError::IoError(e.to_string()))?;
        Ok(Self { root })
    }

    fn full_path(&self, path: &str) -> ColdStoreResult<PathBuf> {
        let relative = Path::new(path);
        let clean = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            return Err(ColdStoreError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn collect(&self, dir: &Path, prefix: &str, out: &mut Vec<String>) -> ColdStoreResult<()> {
        let entries = fs::read_dir(dir).map_err(|e| ColdStoreError::IoError(e.to_string()))?;
        for entry in entries {
            let entry = entry.map_err(|e| ColdStoreError::IoError(e.to_string()))?;
            let name = match entry.file_name().to_str() {
                Some(name) => name.to_string(),
                None => continue,
            };
            // staging files from in-flight writes
            if name.starts_with('.') {
                continue;
            }
            let path = if prefix.is_empty() {
                name
            } else {
                format!("{}/{}", prefix, name)
            };
            let file_type = entry
                .file_type()
                .map_err(|e| ColdStoreError::IoError(e.to_string()))?;
            if file_type.is_dir() {
                self.collect(&entry.path(), &path, out)?;
            } else {
                out.push(path);
            }
        }
        Ok(())
    }
}

impl ColdStore for LocalColdStore {
    fn put(&self, path: &str, data: &[u8]) -> ColdStoreResult<()> {
        let full_path = self.full_path(path)?;
        let parent = full_path.parent().unwrap_or(&self.root).to_path_buf();
        fs::create_dir_all(&parent).map_err(|e| ColdStoreError::IoError(e.to_string()))?;

        let staging = parent.join(format!(".{}.tmp", Uuid::new_v4()));
        fs::write(&staging, data).map_err(|e| ColdStoreError::IoError(e.to_string()))?;
        fs::rename(&staging, &full_path).map_err(|e| {
            let _ = fs::remove_file(&staging);
            ColdStoreError::IoError(e.to_string())
        })
    }

    fn get(&self, path: &str) -> ColdStoreResult<Vec<u8>> {
        let full_path = self.full_path(path)?;
        fs::read(&full_path).map_err(|e| ColdStoreError::from_io(path, e))
    }

    fn delete(&self, path: &str) -> ColdStoreResult<()> {
        let full_path = self.full_path(path)?;
        fs::remove_file(&full_path).map_err(|e| ColdStoreError::from_io(path, e))
    }

    fn exists(&self, path: &str) -> ColdStoreResult<bool> {
        Ok(self.full_path(path)?.is_file())
    }

    fn list(&self, prefix: Option<&str>) -> ColdStoreResult<Vec<String>> {
        let mut results = Vec::new();
        self.collect(&self.root, "", &mut results)?;
        if let Some(prefix) = prefix {
            results.retain(|path| path.starts_with(prefix));
        }
        results.sort();
        Ok(results)
    }
}
