//! Clipboard port.

use async_trait::async_trait;

use crate::error::Result;

/// Source of clipboard text samples.
///
/// Failures should be reported as
/// [`MermaidLiveError::ClipboardUnavailable`](crate::error::MermaidLiveError::ClipboardUnavailable);
/// the watcher treats them like an empty clipboard.
#[async_trait]
pub trait ClipboardSource: Send + Sync {
    /// Reads the current clipboard text. `None` means empty or non-text.
    async fn read_text(&self) -> Result<Option<String>>;
}
