//! History domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of records kept in the history.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// A previously rendered diagram.
///
/// `description` doubles as the dedup key: the history never holds two
/// records with the same description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiagramRecord {
    /// Unique record identifier (UUID format)
    pub id: String,
    /// Raw Mermaid text. Never mutated after creation.
    pub description: String,
    /// Auto-generated on creation, user-editable afterwards.
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    /// Updated on every render or reopen.
    pub last_accessed_at: DateTime<Utc>,
    pub pinned: bool,
}

impl DiagramRecord {
    /// Creates a new unpinned record with a fresh id.
    pub fn new(
        description: impl Into<String>,
        display_name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description: description.into(),
            display_name: display_name.into(),
            created_at: now,
            last_accessed_at: now,
            pinned: false,
        }
    }

    /// Marks the record as accessed at `now`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_accessed_at = now;
    }
}

/// Sorts records for display: pinned first, then most recently accessed.
///
/// The sort is stable, so records with equal keys keep their stored order.
pub fn sort_for_display(records: &mut [DiagramRecord]) {
    records.sort_by(|a, b| {
        b.pinned
            .cmp(&a.pinned)
            .then_with(|| b.last_accessed_at.cmp(&a.last_accessed_at))
    });
}
