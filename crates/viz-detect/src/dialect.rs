//! Diagram dialect definitions.
//!
//! Two dialect families are recognized: Mermaid (flowchart-style syntax with
//! a leading diagram-type keyword) and `PlantUML` (UML-style syntax delimited
//! by `@startuml`/`@enduml` directives).

/// Mermaid diagram-type keywords that can open a bare (unfenced) block.
pub const MERMAID_KEYWORDS: &[&str] = &[
    "flowchart",
    "graph",
    "sequenceDiagram",
    "classDiagram",
    "stateDiagram",
    "erDiagram",
    "journey",
    "gantt",
    "pie",
    "gitGraph",
    "mindmap",
    "timeline",
];

/// Supported diagram dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Dialect {
    Mermaid,
    PlantUml,
}

impl Dialect {
    /// Parse a dialect from a code fence info string.
    ///
    /// Supports both direct names (`mermaid`) and `kroki-` prefixed names
    /// (`kroki-mermaid`) for compatibility with Kroki-style fences.
    ///
    /// Returns None if the info string is not a supported dialect.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let lang = s.strip_prefix("kroki-").unwrap_or(s);

        match lang {
            "mermaid" => Some(Self::Mermaid),
            "plantuml" | "puml" => Some(Self::PlantUml),
            _ => None,
        }
    }

    /// Canonical name of this dialect.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mermaid => "mermaid",
            Self::PlantUml => "plantuml",
        }
    }
}

/// Whether a line opens with a Mermaid diagram-type keyword.
///
/// The keyword must be followed by whitespace, end-of-line, or a Mermaid
/// direction suffix (`graph TD`, `flowchart LR`), so that prose words that
/// merely start with a keyword (`pieces`, `gantties`) do not match.
#[must_use]
pub fn mermaid_keyword_at_line_start(line: &str) -> Option<&'static str> {
    let trimmed = line.trim_start();
    if line.len() - trimmed.len() >= 4 {
        // Indented four or more spaces: continuation, not a block opener.
        return None;
    }
    for keyword in MERMAID_KEYWORDS {
        if let Some(rest) = trimmed.strip_prefix(keyword) {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return Some(keyword);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_direct_names() {
        assert_eq!(Dialect::parse("mermaid"), Some(Dialect::Mermaid));
        assert_eq!(Dialect::parse("plantuml"), Some(Dialect::PlantUml));
        assert_eq!(Dialect::parse("puml"), Some(Dialect::PlantUml));
        assert_eq!(Dialect::parse("rust"), None);
        assert_eq!(Dialect::parse(""), None);
    }

    #[test]
    fn test_parse_kroki_prefix() {
        assert_eq!(Dialect::parse("kroki-mermaid"), Some(Dialect::Mermaid));
        assert_eq!(Dialect::parse("kroki-plantuml"), Some(Dialect::PlantUml));
        assert_eq!(Dialect::parse("kroki-unknown"), None);
        assert_eq!(Dialect::parse("kroki-"), None);
    }

    #[test]
    fn test_as_str() {
        assert_eq!(Dialect::Mermaid.as_str(), "mermaid");
        assert_eq!(Dialect::PlantUml.as_str(), "plantuml");
    }

    #[test]
    fn test_keyword_at_line_start() {
        assert_eq!(
            mermaid_keyword_at_line_start("flowchart TD"),
            Some("flowchart")
        );
        assert_eq!(mermaid_keyword_at_line_start("graph"), Some("graph"));
        assert_eq!(
            mermaid_keyword_at_line_start("sequenceDiagram"),
            Some("sequenceDiagram")
        );
        // Prose words that merely share a prefix must not match
        assert_eq!(mermaid_keyword_at_line_start("graphics card"), None);
        assert_eq!(mermaid_keyword_at_line_start("pies are tasty"), None);
        // Heavily indented lines are continuation syntax, not openers
        assert_eq!(mermaid_keyword_at_line_start("    graph TD"), None);
    }
}
