//! Error types for mermaid-live.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the whole mermaid-live workspace.
///
/// Expected conditions (an empty clipboard, text that is not a diagram) are
/// modeled as [`ActiveDiagram`](crate::active::ActiveDiagram) states, never as
/// errors. Only unexpected I/O and encoding failures end up here.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum MermaidLiveError {
    /// Diagram text could not be turned into a render token (or back).
    #[error("Codec error: {0}")]
    Codec(String),

    /// Persistence layer could not be read or written.
    #[error("Store error: {0}")]
    Store(String),

    /// The system clipboard could not be read.
    #[error("Clipboard unavailable: {0}")]
    ClipboardUnavailable(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "JSON", "TOML"
        message: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A command was issued while the active diagram could not accept it.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MermaidLiveError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Codec error
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec(message.into())
    }

    /// Creates a Store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Creates a ClipboardUnavailable error
    pub fn clipboard(message: impl Into<String>) -> Self {
        Self::ClipboardUnavailable(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an InvalidState error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_codec(&self) -> bool {
        matches!(self, Self::Codec(_))
    }

    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    pub fn is_clipboard_unavailable(&self) -> bool {
        matches!(self, Self::ClipboardUnavailable(_))
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState(_))
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for MermaidLiveError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for MermaidLiveError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for MermaidLiveError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, MermaidLiveError>`.
pub type Result<T> = std::result::Result<T, MermaidLiveError>;
