//! Keyword heuristics for recognizing and labeling Mermaid diagrams.

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

/// Leading keywords of the supported diagram types.
pub const DIAGRAM_KEYWORDS: [&str; 13] = [
    "graph",
    "flowchart",
    "sequenceDiagram",
    "classDiagram",
    "stateDiagram",
    "erDiagram",
    "gantt",
    "pie",
    "journey",
    "gitGraph",
    "mindmap",
    "timeline",
    "quadrantChart",
];

/// Coarse diagram kind, used for auto-naming and display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagramKind {
    Flowchart,
    Sequence,
    Class,
    State,
    Er,
    Gantt,
    Pie,
    Journey,
    Git,
    Mindmap,
    Timeline,
    Quadrant,
    Other,
}

/// Priority-ordered keyword table for everything except flowcharts,
/// which are matched by prefix first.
const KIND_TABLE: [(&str, DiagramKind); 11] = [
    ("sequenceDiagram", DiagramKind::Sequence),
    ("classDiagram", DiagramKind::Class),
    ("stateDiagram", DiagramKind::State),
    ("erDiagram", DiagramKind::Er),
    ("gantt", DiagramKind::Gantt),
    ("pie", DiagramKind::Pie),
    ("journey", DiagramKind::Journey),
    ("gitGraph", DiagramKind::Git),
    ("mindmap", DiagramKind::Mindmap),
    ("timeline", DiagramKind::Timeline),
    ("quadrantChart", DiagramKind::Quadrant),
];

impl DiagramKind {
    pub fn label(&self) -> &'static str {
        match self {
            DiagramKind::Flowchart => "Flowchart",
            DiagramKind::Sequence => "Sequence",
            DiagramKind::Class => "Class",
            DiagramKind::State => "State",
            DiagramKind::Er => "ER",
            DiagramKind::Gantt => "Gantt",
            DiagramKind::Pie => "Pie",
            DiagramKind::Journey => "Journey",
            DiagramKind::Git => "Git",
            DiagramKind::Mindmap => "Mindmap",
            DiagramKind::Timeline => "Timeline",
            DiagramKind::Quadrant => "Quadrant",
            DiagramKind::Other => "Diagram",
        }
    }
}

impl std::fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Returns true if `text` plausibly is a Mermaid diagram description.
///
/// A keyword must open the trimmed text or directly follow a newline or a
/// space. Matching is case-sensitive.
pub fn is_candidate(text: &str) -> bool {
    let trimmed = text.trim();
    DIAGRAM_KEYWORDS.iter().any(|keyword| {
        trimmed.starts_with(keyword)
            || trimmed.contains(&format!("\n{}", keyword))
            || trimmed.contains(&format!(" {}", keyword))
    })
}

/// Classifies a description into a [`DiagramKind`].
pub fn classify(text: &str) -> DiagramKind {
    let trimmed = text.trim();
    if trimmed.starts_with("graph") || trimmed.starts_with("flowchart") {
        return DiagramKind::Flowchart;
    }
    KIND_TABLE
        .iter()
        .find(|(keyword, _)| trimmed.contains(keyword))
        .map(|(_, kind)| *kind)
        .unwrap_or(DiagramKind::Other)
}

/// Default display name for a freshly saved diagram: `"{kind} - M/D/YYYY"`.
pub fn auto_name<Tz: TimeZone>(text: &str, now: &DateTime<Tz>) -> String {
    let local = now.with_timezone(&Local);
    format!("{} - {}", classify(text).label(), local.format("%-m/%-d/%Y"))
}

/// Line/character counts shown next to a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramStats {
    pub kind: DiagramKind,
    pub lines: usize,
    pub characters: usize,
}

impl DiagramStats {
    pub fn of(text: &str) -> Self {
        Self {
            kind: classify(text),
            lines: text.split('\n').count(),
            characters: text.chars().count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_candidate_at_start() {
        assert!(is_candidate("graph TD\nA-->B"));
        assert!(is_candidate("   sequenceDiagram\n  A->>B: hi"));
    }

    #[test]
    fn test_candidate_after_newline_or_space() {
        assert!(is_candidate("%% title\nflowchart LR\nA-->B"));
        assert!(is_candidate("```mermaid pie title Pets"));
    }

    #[test]
    fn test_plain_text_is_not_candidate() {
        assert!(!is_candidate("hello world"));
        assert!(!is_candidate(""));
        // embedded without a delimiter does not count
        assert!(!is_candidate("autographed copy"));
    }

    #[test]
    fn test_candidate_is_case_sensitive() {
        assert!(!is_candidate("Graph TD"));
        assert!(!is_candidate("SEQUENCEDIAGRAM"));
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("graph TD\nA-->B"), DiagramKind::Flowchart);
        assert_eq!(classify("flowchart LR"), DiagramKind::Flowchart);
        assert_eq!(classify("sequenceDiagram\nA->>B: hi"), DiagramKind::Sequence);
        assert_eq!(classify("erDiagram\nA ||--o{ B : has"), DiagramKind::Er);
        assert_eq!(classify("quadrantChart"), DiagramKind::Quadrant);
        assert_eq!(classify("hello world"), DiagramKind::Other);
        assert_eq!(classify("hello world").label(), "Diagram");
    }

    #[test]
    fn test_classify_priority() {
        // a flowchart mentioning another keyword stays a flowchart
        assert_eq!(classify("graph TD\nA[gantt] --> B"), DiagramKind::Flowchart);
        // earlier table entries win
        assert_eq!(
            classify("%% x\nclassDiagram\n%% sequenceDiagram"),
            DiagramKind::Sequence
        );
    }

    #[test]
    fn test_auto_name() {
        let now = Utc::now();
        let name = auto_name("graph TD\nA-->B", &now);
        let expected_date = now.with_timezone(&Local).format("%-m/%-d/%Y").to_string();
        assert_eq!(name, format!("Flowchart - {}", expected_date));
    }

    #[test]
    fn test_stats() {
        let stats = DiagramStats::of("graph TD\nA-->B");
        assert_eq!(stats.kind, DiagramKind::Flowchart);
        assert_eq!(stats.lines, 2);
        assert_eq!(stats.characters, 14);
    }
}
