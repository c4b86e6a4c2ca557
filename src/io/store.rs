// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Local key-value storage for autosave checkpoints.
//!
//! The store is a plain string-to-string map. [`FileStore`] keeps one file
//! per key on disk, [`MemoryStore`] keeps everything in process.

use std::collections::HashMap;
use std::path::PathBuf;

/// Errors raised by a key-value store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Minimal persistent map used for checkpoints.
pub trait KeyValueStore {
    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
}

/// Store backed by a directory, one `<key>.json` file per key.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.root)?;
        // Write then rename so a crash never leaves a half-written checkpoint.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("crease-store-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_file_store_put_get() {
        let root = temp_root("put-get");
        let mut store = FileStore::new(&root);

        assert_eq!(store.get("annotations_clip_1").unwrap(), None);
        store.put("annotations_clip_1", "{\"a\":1}").unwrap();
        assert_eq!(
            store.get("annotations_clip_1").unwrap().as_deref(),
            Some("{\"a\":1}")
        );

        store.put("annotations_clip_1", "{}").unwrap();
        assert_eq!(store.get("annotations_clip_1").unwrap().as_deref(), Some("{}"));

        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let mut store = FileStore::new(temp_root("keys"));
        assert!(matches!(
            store.put("../escape", "x"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(store.get(""), Err(StoreError::InvalidKey(_))));
    }
}
