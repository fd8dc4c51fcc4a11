//! Unified path management for mermaid-live files.

use std::path::{Path, PathBuf};

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves where mermaid-live keeps its files.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/mermaid-live/      # Config directory
/// └── config.toml              # Settings
///
/// ~/.local/share/mermaid-live/ # Data directory
/// └── store.json               # Key-value store (history, last diagram)
/// ```
///
/// With a base directory override (tests, `--data-dir`), both live directly
/// under the base.
#[derive(Debug, Clone, Default)]
pub struct MermaidLivePaths {
    base: Option<PathBuf>,
}

impl MermaidLivePaths {
    const APP_DIR: &'static str = "mermaid-live";
    const CONFIG_FILE: &'static str = "config.toml";
    const STORE_FILE: &'static str = "store.json";

    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(Self::APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join(Self::APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join(Self::CONFIG_FILE))
    }

    pub fn store_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join(Self::STORE_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_override() {
        let paths = MermaidLivePaths::new(Some(Path::new("/tmp/ml")));
        assert_eq!(paths.config_file().unwrap(), PathBuf::from("/tmp/ml/config.toml"));
        assert_eq!(paths.store_file().unwrap(), PathBuf::from("/tmp/ml/store.json"));
    }

    #[test]
    fn test_default_paths_end_with_app_dir() {
        let paths = MermaidLivePaths::default();
        if let Ok(store) = paths.store_file() {
            assert!(store.ends_with("mermaid-live/store.json"));
        }
    }
}
