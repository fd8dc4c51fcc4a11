use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::codec::{DEFAULT_EDITOR_BASE_URL, DEFAULT_IMAGE_BASE_URL, DEFAULT_THEME, RenderUrls};
use crate::history::DEFAULT_HISTORY_LIMIT;

/// User settings, read from `config.toml`. Every field is optional in the file.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Clipboard polling period in milliseconds.
    pub poll_interval_ms: u64,
    pub history_limit: usize,
    /// Mermaid theme baked into render tokens.
    pub theme: String,
    pub image_base_url: String,
    pub editor_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            history_limit: DEFAULT_HISTORY_LIMIT,
            theme: DEFAULT_THEME.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            editor_base_url: DEFAULT_EDITOR_BASE_URL.to_string(),
        }
    }
}

impl Settings {
    pub fn poll_interval(&self) -> Duration {
        // a zero period would make tokio::time::interval panic
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn render_urls(&self) -> RenderUrls {
        RenderUrls::new(&self.image_base_url, &self.editor_base_url)
    }
}
