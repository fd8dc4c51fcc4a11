//! File-backed key-value store.
//!
//! All keys live in one JSON object file. Every `set` rewrites the whole
//! document through [`AtomicFile`], so readers always see a complete file.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use mermaid_live_core::error::{MermaidLiveError, Result};
use mermaid_live_core::store::KeyValueStore;

use super::atomic_file::AtomicFile;

type Entries = BTreeMap<String, String>;

/// [`KeyValueStore`] persisted as a single JSON object file.
#[derive(Clone)]
pub struct JsonFileKeyValueStore {
    file: Arc<AtomicFile<Entries>>,
    /// Serializes writers within this process; the file lock covers other processes.
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileKeyValueStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicFile::json(path)),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }
}

#[async_trait]
impl KeyValueStore for JsonFileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        // Readers don't take the write lock: renames make every snapshot complete.
        let file = self.file.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || {
            let entries = file.load().map_err(|e| {
                MermaidLiveError::store(format!(
                    "Failed to read {}: {}",
                    file.path().display(),
                    e
                ))
            })?;
            Ok(entries.and_then(|mut map| map.remove(&key)))
        })
        .await
        .map_err(|e| MermaidLiveError::internal(format!("Failed to join task: {}", e)))?
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let file = self.file.clone();
        let key = key.to_string();
        let value = value.to_string();
        tokio::task::spawn_blocking(move || {
            file.update(Entries::new(), |entries| {
                entries.insert(key, value);
                Ok(())
            })
            .map_err(|e| {
                MermaidLiveError::store(format!(
                    "Failed to write {}: {}",
                    file.path().display(),
                    e
                ))
            })
        })
        .await
        .map_err(|e| MermaidLiveError::internal(format!("Failed to join task: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_store() -> (JsonFileKeyValueStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileKeyValueStore::new(temp_dir.path().join("store.json"));
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_get_from_missing_file() {
        let (store, _temp_dir) = create_store();
        assert!(store.get("history").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let (store, _temp_dir) = create_store();
        store.set("last-description", "graph TD").await.unwrap();
        store.set("last-updated-at", "2026-01-01T00:00:00Z").await.unwrap();

        assert_eq!(
            store.get("last-description").await.unwrap().as_deref(),
            Some("graph TD")
        );
        assert_eq!(
            store.get("last-updated-at").await.unwrap().as_deref(),
            Some("2026-01-01T00:00:00Z")
        );
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let (store, temp_dir) = create_store();
        store.set("history", "[]").await.unwrap();

        let reopened = JsonFileKeyValueStore::new(temp_dir.path().join("store.json"));
        assert_eq!(reopened.get("history").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sets_keep_every_key() {
        let (store, _temp_dir) = create_store();

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.set(&format!("key-{}", i), &i.to_string()).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        for i in 0..16 {
            assert_eq!(
                store.get(&format!("key-{}", i)).await.unwrap(),
                Some(i.to_string())
            );
        }
    }

    #[tokio::test]
    async fn test_corrupt_file_is_store_error() {
        let (store, _temp_dir) = create_store();
        std::fs::write(store.path(), "{not json").unwrap();

        let err = store.get("history").await.unwrap_err();
        assert!(err.is_store());
    }
}
