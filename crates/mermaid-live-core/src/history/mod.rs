//! Diagram history domain models and repository trait.
//!
//! The history is an ordered, capped collection of previously rendered
//! diagrams, deduplicated by description.

mod model;
mod repository;

pub use model::{DEFAULT_HISTORY_LIMIT, DiagramRecord, sort_for_display};
pub use repository::{AutoNameFn, HistoryRepository};
