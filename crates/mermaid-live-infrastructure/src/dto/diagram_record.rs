//! Diagram record DTOs and legacy migration
//!
//! ## Version History
//! - **legacy**: `code`, `name`, `createdAt`, `isPinned`; `lastAccessed` added
//!   later, so older entries lack it
//! - **current**: `description`, `displayName`, `createdAt`, `lastAccessedAt`,
//!   `pinned`
//!
//! Both shapes deserialize into [`DiagramRecordDto`]; missing timestamps are
//! back-filled when converting to the domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use mermaid_live_core::history::DiagramRecord;

/// Persisted diagram record, tolerant of every shape ever written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramRecordDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(alias = "code")]
    pub description: String,
    #[serde(default, alias = "name")]
    pub display_name: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "lastAccessed", deserialize_with = "lenient_timestamp")]
    pub last_accessed_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "isPinned")]
    pub pinned: bool,
}

/// Reads an RFC 3339 timestamp, mapping absent, empty or unparsable values to `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

impl DiagramRecordDto {
    /// True if converting this DTO has to invent data.
    pub fn needs_migration(&self) -> bool {
        self.id.is_none() || self.created_at.is_none() || self.last_accessed_at.is_none()
    }

    /// Converts to the domain model, back-filling missing fields.
    ///
    /// `last_accessed_at` falls back to `created_at`, and both fall back to `now`.
    pub fn into_domain(self, now: DateTime<Utc>) -> DiagramRecord {
        let created_at = self.created_at.unwrap_or(now);
        DiagramRecord {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            description: self.description,
            display_name: self.display_name,
            created_at,
            last_accessed_at: self.last_accessed_at.unwrap_or(created_at),
            pinned: self.pinned,
        }
    }
}

impl From<&DiagramRecord> for DiagramRecordDto {
    fn from(record: &DiagramRecord) -> Self {
        DiagramRecordDto {
            id: Some(record.id.clone()),
            description: record.description.clone(),
            display_name: record.display_name.clone(),
            created_at: Some(record.created_at),
            last_accessed_at: Some(record.last_accessed_at),
            pinned: record.pinned,
        }
    }
}

/// Result of reading the persisted history.
#[derive(Debug, Clone, Default)]
pub struct LoadedHistory {
    pub records: Vec<DiagramRecord>,
    /// True if any record had to be back-filled.
    pub migrated: bool,
}

/// Parses the persisted history collection.
pub fn parse_history(json: &str, now: DateTime<Utc>) -> serde_json::Result<LoadedHistory> {
    let dtos: Vec<DiagramRecordDto> = serde_json::from_str(json)?;
    let migrated = dtos.iter().any(DiagramRecordDto::needs_migration);
    let records = dtos.into_iter().map(|dto| dto.into_domain(now)).collect();
    Ok(LoadedHistory { records, migrated })
}

/// Serializes the history collection in the current shape.
pub fn render_history(records: &[DiagramRecord]) -> serde_json::Result<String> {
    let dtos: Vec<DiagramRecordDto> = records.iter().map(DiagramRecordDto::from).collect();
    serde_json::to_string(&dtos)
}
