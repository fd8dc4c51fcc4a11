//! Key-value backed HistoryRepository implementation.
//!
//! The whole history lives under [`StoreKeys::HISTORY`] as one JSON array.
//! Each mutation loads it, changes it, and writes it back in one piece while
//! holding the repository's mutation lock, so concurrent mutations (a poll
//! saving a diagram while the user pins another) never overwrite each other.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

use mermaid_live_core::error::{MermaidLiveError, Result};
use mermaid_live_core::history::{
    AutoNameFn, DEFAULT_HISTORY_LIMIT, DiagramRecord, HistoryRepository, sort_for_display,
};
use mermaid_live_core::store::{KeyValueStore, StoreKeys};

use crate::dto::{LoadedHistory, parse_history, render_history};

/// History store on top of any [`KeyValueStore`].
pub struct KvHistoryRepository {
    store: Arc<dyn KeyValueStore>,
    limit: usize,
    /// Held for the whole read-modify-write of every mutation.
    mutation_lock: Mutex<()>,
}

impl KvHistoryRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_limit(store, DEFAULT_HISTORY_LIMIT)
    }

    /// Creates a repository keeping at most `limit` records (at least one).
    pub fn with_limit(store: Arc<dyn KeyValueStore>, limit: usize) -> Self {
        Self {
            store,
            limit: limit.max(1),
            mutation_lock: Mutex::new(()),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Reads the collection in stored order. An absent key is an empty history.
    async fn load(&self) -> Result<LoadedHistory> {
        let Some(json) = self.store.get(StoreKeys::HISTORY).await? else {
            return Ok(LoadedHistory::default());
        };
        if json.trim().is_empty() {
            return Ok(LoadedHistory::default());
        }
        parse_history(&json, Utc::now())
            .map_err(|e| MermaidLiveError::store(format!("Failed to parse history: {}", e)))
    }

    async fn save(&self, records: &[DiagramRecord]) -> Result<()> {
        let json = render_history(records)
            .map_err(|e| MermaidLiveError::store(format!("Failed to serialize history: {}", e)))?;
        self.store.set(StoreKeys::HISTORY, &json).await
    }

    /// Runs `f` against the current collection under the mutation lock.
    ///
    /// `f` returns its result and whether the collection changed; only
    /// changed collections are written back.
    async fn mutate<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Vec<DiagramRecord>) -> (R, bool) + Send,
        R: Send,
    {
        let _guard = self.mutation_lock.lock().await;

        let mut records = self.load().await?.records;
        let (result, changed) = f(&mut records);
        if changed {
            self.save(&records).await?;
        }
        Ok(result)
    }
}

#[async_trait]
impl HistoryRepository for KvHistoryRepository {
    async fn migrate(&self) -> Result<bool> {
        let _guard = self.mutation_lock.lock().await;

        let loaded = self.load().await?;
        if !loaded.migrated {
            tracing::debug!(target: "history", "History already up to date");
            return Ok(false);
        }

        self.save(&loaded.records).await?;
        tracing::info!(
            target: "history",
            "Migrated {} history records",
            loaded.records.len()
        );
        Ok(true)
    }

    async fn list(&self) -> Result<Vec<DiagramRecord>> {
        let mut records = self.load().await?.records;
        sort_for_display(&mut records);
        Ok(records)
    }

    async fn upsert_by_description(
        &self,
        description: &str,
        auto_name: AutoNameFn<'_>,
    ) -> Result<DiagramRecord> {
        let now = Utc::now();
        let limit = self.limit;

        self.mutate(|records| {
            let record = match records.iter_mut().find(|r| r.description == description) {
                Some(existing) => {
                    existing.touch(now);
                    tracing::debug!(target: "history", "Touched record {}", existing.id);
                    existing.clone()
                }
                None => {
                    let record = DiagramRecord::new(description, auto_name(description), now);
                    tracing::info!(
                        target: "history",
                        "Saved new record {} ({})",
                        record.id,
                        record.display_name
                    );
                    records.insert(0, record.clone());
                    record
                }
            };

            if records.len() > limit {
                // Eviction is by position only; pinned records are not protected.
                let evicted = records.len() - limit;
                records.truncate(limit);
                tracing::debug!(target: "history", "Evicted {} records past the cap", evicted);
            }

            (record, true)
        })
        .await
    }

    async fn find_by_description(&self, description: &str) -> Result<Option<DiagramRecord>> {
        Ok(self
            .load()
            .await?
            .records
            .into_iter()
            .find(|r| r.description == description))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<DiagramRecord>> {
        Ok(self.load().await?.records.into_iter().find(|r| r.id == id))
    }

    async fn touch(&self, id: &str) -> Result<Option<DiagramRecord>> {
        let now = Utc::now();
        self.mutate(|records| match records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.touch(now);
                (Some(record.clone()), true)
            }
            None => (None, false),
        })
        .await
    }

    async fn rename(&self, id: &str, new_name: &str) -> Result<Option<DiagramRecord>> {
        let new_name = new_name.trim();
        self.mutate(|records| match records.iter_mut().find(|r| r.id == id) {
            Some(record) if !new_name.is_empty() => {
                record.display_name = new_name.to_string();
                (Some(record.clone()), true)
            }
            Some(record) => (Some(record.clone()), false),
            None => (None, false),
        })
        .await
    }

    async fn toggle_pin(&self, id: &str) -> Result<Option<DiagramRecord>> {
        self.mutate(|records| match records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.pinned = !record.pinned;
                (Some(record.clone()), true)
            }
            None => (None, false),
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        self.mutate(|records| {
            let before = records.len();
            records.retain(|r| r.id != id);
            let removed = records.len() != before;
            (removed, removed)
        })
        .await
    }
}
