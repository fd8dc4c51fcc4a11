//! Wiring of settings, storage and repositories shared by all commands.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use mermaid_live_core::active::LastRenderedRepository;
use mermaid_live_core::codec::RenderUrls;
use mermaid_live_core::config::Settings;
use mermaid_live_core::history::HistoryRepository;
use mermaid_live_core::store::KeyValueStore;
use mermaid_live_infrastructure::config_service;
use mermaid_live_infrastructure::{
    JsonFileKeyValueStore, KvHistoryRepository, KvLastRenderedRepository, MermaidLivePaths,
};

pub struct AppContext {
    pub settings: Settings,
    pub history: Arc<dyn HistoryRepository>,
    pub last_rendered: Arc<dyn LastRenderedRepository>,
}

impl AppContext {
    /// Opens settings and storage, and migrates legacy history records so
    /// that every command sees persisted ids.
    pub async fn load(base: Option<&Path>) -> Result<Self> {
        let paths = MermaidLivePaths::new(base);

        let config_file = paths.config_file()?;
        if config_service::ensure_settings_file(&config_file)? {
            tracing::info!(target: "config", "Created {}", config_file.display());
        }
        let settings = config_service::load_settings(&config_file)?;

        let store_file = paths.store_file()?;
        tracing::debug!(target: "store", "Using store at {}", store_file.display());
        let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileKeyValueStore::new(store_file));

        let history: Arc<dyn HistoryRepository> = Arc::new(KvHistoryRepository::with_limit(
            store.clone(),
            settings.history_limit,
        ));
        if history.migrate().await? {
            tracing::info!(target: "history", "Migrated legacy history records");
        }

        Ok(Self {
            history,
            last_rendered: Arc::new(KvLastRenderedRepository::new(store)),
            settings,
        })
    }

    pub fn urls(&self) -> RenderUrls {
        self.settings.render_urls()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_creates_default_config() {
        let temp_dir = TempDir::new().unwrap();

        let ctx = AppContext::load(Some(temp_dir.path())).await.unwrap();

        assert_eq!(ctx.settings, Settings::default());
        assert!(temp_dir.path().join("config.toml").exists());
        assert!(ctx.history.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_persists_between_contexts() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("config.toml"), "history_limit = 1\n").unwrap();

        let ctx = AppContext::load(Some(temp_dir.path())).await.unwrap();
        ctx.history
            .upsert_by_description("pie title A", &|_: &str| "A".to_string())
            .await
            .unwrap();
        ctx.history
            .upsert_by_description("pie title B", &|_: &str| "B".to_string())
            .await
            .unwrap();

        let reopened = AppContext::load(Some(temp_dir.path())).await.unwrap();
        let records = reopened.history.list().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].display_name, "B");
    }

    #[tokio::test]
    async fn test_load_persists_ids_of_legacy_records() {
        let temp_dir = TempDir::new().unwrap();
        let legacy = r#"[{"code":"pie title Pets","name":"Pets","createdAt":"2024-01-01T00:00:00Z","isPinned":false}]"#;
        let store = serde_json::json!({ "history": legacy });
        std::fs::write(temp_dir.path().join("store.json"), store.to_string()).unwrap();

        let ctx = AppContext::load(Some(temp_dir.path())).await.unwrap();
        let listed = ctx.history.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        let id = listed[0].id.clone();

        assert_eq!(ctx.history.list().await.unwrap()[0].id, id);
        let pinned = ctx.history.toggle_pin(&id).await.unwrap().unwrap();
        assert!(pinned.pinned);
        assert_eq!(pinned.display_name, "Pets");
    }
}
