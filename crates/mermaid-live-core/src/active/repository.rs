//! Last rendered diagram repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The most recently accepted diagram, restored on startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LastRendered {
    pub description: String,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Repository for the last accepted diagram.
#[async_trait]
pub trait LastRenderedRepository: Send + Sync {
    /// Returns the last accepted diagram, if any was ever saved.
    async fn load(&self) -> Result<Option<LastRendered>>;

    async fn save(&self, description: &str, updated_at: DateTime<Utc>) -> Result<()>;
}
