//! History repository trait.

use async_trait::async_trait;

use super::model::DiagramRecord;
use crate::error::Result;

/// Produces the display name for a newly created record from its description.
pub type AutoNameFn<'a> = &'a (dyn Fn(&str) -> String + Send + Sync);

/// Repository for the persisted diagram history.
///
/// Every mutating operation is an atomic read-modify-write of the whole
/// collection; implementations must serialize them so that concurrent callers
/// never lose each other's updates.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Back-fills fields missing from legacy records.
    ///
    /// Returns `true` if anything was written. Running it again is a no-op.
    async fn migrate(&self) -> Result<bool>;

    /// Returns all records, pinned first, then by last access (most recent first).
    async fn list(&self) -> Result<Vec<DiagramRecord>>;

    /// Touches the record with this exact description, or creates one at the
    /// head of the history (evicting from the tail past the cap).
    async fn upsert_by_description(
        &self,
        description: &str,
        auto_name: AutoNameFn<'_>,
    ) -> Result<DiagramRecord>;

    async fn find_by_description(&self, description: &str) -> Result<Option<DiagramRecord>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<DiagramRecord>>;

    /// Updates `last_accessed_at` of an existing record (history "reopen").
    async fn touch(&self, id: &str) -> Result<Option<DiagramRecord>>;

    /// Renames a record. Unknown ids and blank names are ignored.
    async fn rename(&self, id: &str, new_name: &str) -> Result<Option<DiagramRecord>>;

    /// Flips the pinned flag. Unknown ids are ignored.
    async fn toggle_pin(&self, id: &str) -> Result<Option<DiagramRecord>>;

    /// Removes a record. Returns whether a record was removed.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Case-insensitive name filter over [`list`](Self::list).
    async fn search(&self, query: &str) -> Result<Vec<DiagramRecord>> {
        let records = self.list().await?;
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(records);
        }
        Ok(records
            .into_iter()
            .filter(|r| r.display_name.to_lowercase().contains(&query))
            .collect())
    }
}
