//! Key-value persistence port.

use async_trait::async_trait;

use crate::error::Result;

/// Logical keys under which mermaid-live persists its data.
pub struct StoreKeys;

impl StoreKeys {
    /// JSON array of [`DiagramRecord`](crate::history::DiagramRecord)s.
    pub const HISTORY: &'static str = "history";
    /// Most recently accepted diagram description.
    pub const LAST_DESCRIPTION: &'static str = "last-description";
    /// RFC 3339 timestamp of the last acceptance.
    pub const LAST_UPDATED_AT: &'static str = "last-updated-at";
}

/// A string-to-string persistent store.
///
/// `set` must replace the value as a whole: readers observe either the old
/// or the new value, never a partial write.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` if the key was never set.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
