//! What the preview currently shows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::DiagramStats;
use crate::history::DiagramRecord;

/// A diagram that has been encoded and can be displayed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RenderedDiagram {
    pub description: String,
    /// Render token for the image/editor URLs.
    pub token: String,
    /// Matching history record; `None` means "not saved".
    pub record: Option<DiagramRecord>,
    pub rendered_at: Option<DateTime<Utc>>,
}

impl RenderedDiagram {
    pub fn is_saved(&self) -> bool {
        self.record.is_some()
    }

    pub fn stats(&self) -> DiagramStats {
        DiagramStats::of(&self.description)
    }
}

/// State of the active diagram.
///
/// Starts in `Loading` and transitions indefinitely; there is no terminal state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ActiveDiagram {
    #[default]
    Loading,
    /// Clipboard is empty.
    Empty,
    /// Clipboard holds text that is not a diagram, and nothing valid is shown.
    Invalid,
    /// A candidate was accepted and is being encoded and saved.
    Rendering,
    Ready(RenderedDiagram),
    Failed { reason: String },
}

impl ActiveDiagram {
    pub fn ready(&self) -> Option<&RenderedDiagram> {
        match self {
            ActiveDiagram::Ready(diagram) => Some(diagram),
            _ => None,
        }
    }

    pub fn ready_mut(&mut self) -> Option<&mut RenderedDiagram> {
        match self {
            ActiveDiagram::Ready(diagram) => Some(diagram),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ActiveDiagram::Ready(_))
    }

    /// Short state name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            ActiveDiagram::Loading => "loading",
            ActiveDiagram::Empty => "empty",
            ActiveDiagram::Invalid => "invalid",
            ActiveDiagram::Rendering => "rendering",
            ActiveDiagram::Ready(_) => "ready",
            ActiveDiagram::Failed { .. } => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(record: Option<DiagramRecord>) -> RenderedDiagram {
        RenderedDiagram {
            description: "graph TD\nA-->B".to_string(),
            token: "token".to_string(),
            record,
            rendered_at: None,
        }
    }

    #[test]
    fn test_default_is_loading() {
        assert_eq!(ActiveDiagram::default(), ActiveDiagram::Loading);
    }

    #[test]
    fn test_ready_accessors() {
        let state = ActiveDiagram::Ready(rendered(None));
        assert!(state.is_ready());
        assert_eq!(state.ready().unwrap().token, "token");
        assert!(!state.ready().unwrap().is_saved());
        assert!(ActiveDiagram::Invalid.ready().is_none());
    }

    #[test]
    fn test_serializes_with_state_tag() {
        let json = serde_json::to_value(ActiveDiagram::Failed {
            reason: "boom".to_string(),
        })
        .unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["reason"], "boom");

        let json = serde_json::to_value(ActiveDiagram::Ready(rendered(None))).unwrap();
        assert_eq!(json["state"], "ready");
        assert_eq!(json["token"], "token");
    }
}
