//! Persisted shapes, kept apart from the domain models.

mod diagram_record;

pub use diagram_record::{DiagramRecordDto, LoadedHistory, parse_history, render_history};
