//! Key-value backed LastRenderedRepository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use mermaid_live_core::active::{LastRendered, LastRenderedRepository};
use mermaid_live_core::error::Result;
use mermaid_live_core::store::{KeyValueStore, StoreKeys};

/// Stores the last accepted description and its timestamp under
/// [`StoreKeys::LAST_DESCRIPTION`] and [`StoreKeys::LAST_UPDATED_AT`].
pub struct KvLastRenderedRepository {
    store: Arc<dyn KeyValueStore>,
}

impl KvLastRenderedRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl LastRenderedRepository for KvLastRenderedRepository {
    async fn load(&self) -> Result<Option<LastRendered>> {
        let Some(description) = self.store.get(StoreKeys::LAST_DESCRIPTION).await? else {
            return Ok(None);
        };
        if description.is_empty() {
            return Ok(None);
        }

        let updated_at = self
            .store
            .get(StoreKeys::LAST_UPDATED_AT)
            .await?
            .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Ok(Some(LastRendered {
            description,
            updated_at,
        }))
    }

    async fn save(&self, description: &str, updated_at: DateTime<Utc>) -> Result<()> {
        self.store
            .set(StoreKeys::LAST_DESCRIPTION, description)
            .await?;
        self.store
            .set(StoreKeys::LAST_UPDATED_AT, &updated_at.to_rfc3339())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;

    #[tokio::test]
    async fn test_load_when_nothing_saved() {
        let repo = KvLastRenderedRepository::new(Arc::new(MemoryKeyValueStore::new()));
        assert!(repo.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let repo = KvLastRenderedRepository::new(Arc::new(MemoryKeyValueStore::new()));
        let now = Utc::now();

        repo.save("graph TD\nA-->B", now).await.unwrap();

        let loaded = repo.load().await.unwrap().unwrap();
        assert_eq!(loaded.description, "graph TD\nA-->B");
        assert_eq!(loaded.updated_at, Some(now));
    }

    #[tokio::test]
    async fn test_unparsable_timestamp_is_dropped() {
        let store = MemoryKeyValueStore::with_entries([
            (StoreKeys::LAST_DESCRIPTION, "pie"),
            (StoreKeys::LAST_UPDATED_AT, "yesterday"),
        ]);
        let repo = KvLastRenderedRepository::new(Arc::new(store));

        let loaded = repo.load().await.unwrap().unwrap();
        assert_eq!(loaded.description, "pie");
        assert!(loaded.updated_at.is_none());
    }
}
