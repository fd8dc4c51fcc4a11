//! Settings loading.

use std::path::Path;

use mermaid_live_core::config::Settings;
use mermaid_live_core::error::{MermaidLiveError, Result};

use crate::storage::AtomicFile;

/// Loads settings from a TOML file. A missing or empty file yields defaults.
pub fn load_settings(path: &Path) -> Result<Settings> {
    let file = AtomicFile::<Settings>::toml(path.to_path_buf());
    let settings = file
        .load()
        .map_err(|e| MermaidLiveError::config(format!("Failed to load {}: {}", path.display(), e)))?
        .unwrap_or_default();

    tracing::debug!(
        target: "config",
        "Loaded settings from {}: {:?}",
        path.display(),
        settings
    );
    Ok(settings)
}

/// Writes a settings file with default values if none exists yet.
///
/// Returns `true` if a file was created.
pub fn ensure_settings_file(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    AtomicFile::<Settings>::toml(path.to_path_buf())
        .save(&Settings::default())
        .map_err(|e| MermaidLiveError::config(format!("Failed to write {}: {}", path.display(), e)))?;
    Ok(true)
}
