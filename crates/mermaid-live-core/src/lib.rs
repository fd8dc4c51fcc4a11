//! Domain layer for mermaid-live.
//!
//! Holds the diagram history model, the active diagram state machine, the
//! render token codec, the diagram classifier, and the ports (clipboard,
//! key-value store, history repository) the outer layers implement.

pub mod active;
pub mod classifier;
pub mod clipboard;
pub mod codec;
pub mod config;
pub mod error;
pub mod history;
pub mod store;

// Re-export common error type
pub use error::MermaidLiveError;
