//! System clipboard backed by `arboard`.

use async_trait::async_trait;

use mermaid_live_core::clipboard::ClipboardSource;
use mermaid_live_core::error::{MermaidLiveError, Result};

/// Reads the OS clipboard. A fresh handle is opened for every sample.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    fn read_blocking() -> Result<Option<String>> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| MermaidLiveError::clipboard(e.to_string()))?;
        match clipboard.get_text() {
            Ok(text) => Ok(Some(text)),
            // non-text content, or nothing copied yet
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(MermaidLiveError::clipboard(e.to_string())),
        }
    }
}

#[async_trait]
impl ClipboardSource for SystemClipboard {
    async fn read_text(&self) -> Result<Option<String>> {
        tokio::task::spawn_blocking(Self::read_blocking)
            .await
            .map_err(|e| MermaidLiveError::clipboard(format!("clipboard task failed: {}", e)))?
    }
}
