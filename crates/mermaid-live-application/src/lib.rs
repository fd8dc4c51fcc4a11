//! Application layer for mermaid-live.
//!
//! - [`DiagramSession`]: the active diagram state machine and its commands
//! - [`ClipboardWatcher`]: polls the clipboard and feeds the session

pub mod session;
pub mod watcher;

pub use session::DiagramSession;
pub use watcher::{ClipboardWatcher, TickOutcome};
