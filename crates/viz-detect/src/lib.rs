//! Diagram source block detection for vizdoc.
//!
//! This crate locates embedded diagram source inside free-form document text
//! and reports exact byte spans, without performing any I/O:
//! - [`detect`] composes four convention scanners (backtick fence,
//!   `@startuml` directive, dash fence, bare keyword) with overlap
//!   resolution
//! - [`contains_any_block`] and [`present_dialects`] are read-only probes
//!   that agree with [`detect`] on every input
//!
//! # Conventions
//!
//! Source documents are not guaranteed to fence diagrams explicitly, so
//! detection layers an exact pass (fences, directives) over a heuristic one
//! (bare diagram-type keywords). Fence matches take precedence over
//! heuristic matches covering the same region.
//!
//! # Example
//!
//! ```
//! use viz_detect::{Dialect, detect};
//!
//! let text = "Intro.\n\n```mermaid\nflowchart TD\n  A --> B\n```\n";
//! let blocks = detect(text);
//! assert_eq!(blocks.len(), 1);
//! assert_eq!(blocks[0].dialect, Dialect::Mermaid);
//! ```

mod consts;
mod dashfence;
mod dialect;
mod directive;
mod fence;
mod keyword;
mod merge;
mod scan;

use std::sync::LazyLock;

use regex::Regex;

pub use consts::MIN_BARE_BLOCK_LEN;
pub use dialect::{Dialect, MERMAID_KEYWORDS};

/// A detected diagram source region.
///
/// Offsets are byte positions into the scanned text; `start < end` and the
/// blocks returned for one text are pairwise non-overlapping, ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Diagram dialect of the region.
    pub dialect: Dialect,
    /// Trimmed diagram source (fence/directive markers stripped).
    pub source: String,
    /// Byte offset of the first byte of the region (including markers).
    pub start: usize,
    /// Byte offset one past the last byte of the region.
    pub end: usize,
}

/// Cheap pre-filter for the existence probe: any fence tag, directive, or
/// line-leading diagram keyword. May over-match (it ignores termination and
/// the trivial-block threshold), so a hit is confirmed via [`detect`].
static PROBE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let keywords = MERMAID_KEYWORDS.join("|");
    Regex::new(&format!(
        r"(?mi)^\s*(?:```\s*(?:kroki-)?(?:mermaid|plantuml|puml)\b|@startuml\b|(?:{keywords})(?:\s|$))"
    ))
    .unwrap()
});

/// Detect all diagram source blocks in `text`.
///
/// Deterministic and pure; absence of blocks yields an empty vector, never
/// an error. Scanner passes run in precedence order: backtick fences,
/// `@startuml` directives, dash fences, bare keywords.
#[must_use]
pub fn detect(text: &str) -> Vec<CodeBlock> {
    detect_with_min_len(text, consts::MIN_BARE_BLOCK_LEN)
}

/// [`detect`] with an explicit bare-keyword length threshold, for callers
/// that make the threshold configurable.
#[must_use]
pub fn detect_with_min_len(text: &str, min_bare_block_len: usize) -> Vec<CodeBlock> {
    let blocks = merge::merge_passes(vec![
        fence::scan(text),
        directive::scan(text),
        dashfence::scan(text),
        keyword::scan(text, min_bare_block_len),
    ]);

    tracing::debug!(
        text_len = text.len(),
        blocks = blocks.len(),
        "detected diagram blocks"
    );
    blocks
}

/// Whether `text` contains at least one diagram block.
///
/// Equivalent to `!detect(text).is_empty()` for every input; a regex
/// pre-filter makes the common negative case cheap.
#[must_use]
pub fn contains_any_block(text: &str) -> bool {
    PROBE_RE.is_match(text) && !detect(text).is_empty()
}

/// Dialects present in `text`, in order of first appearance, deduped.
#[must_use]
pub fn present_dialects(text: &str) -> Vec<Dialect> {
    let mut dialects = Vec::new();
    for block in detect(text) {
        if !dialects.contains(&block.dialect) {
            dialects.push(block.dialect);
        }
    }
    dialects
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MIXED: &str = "\
# Design

Intro paragraph.

```mermaid
flowchart TD
  A[Start] --> B[End]
```

Middle prose.

@startuml
Alice -> Bob: hello
@enduml

Trailing prose.
";

    #[test]
    fn test_detect_mixed_document() {
        let blocks = detect(MIXED);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].dialect, Dialect::Mermaid);
        assert_eq!(blocks[1].dialect, Dialect::PlantUml);
        assert_eq!(blocks[1].source, "Alice -> Bob: hello");
    }

    #[test]
    fn test_blocks_sorted_and_non_overlapping() {
        let blocks = detect(MIXED);

        for pair in blocks.windows(2) {
            assert!(pair[0].start < pair[0].end);
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn test_fence_wins_over_bare_keyword() {
        // The flowchart keyword inside the fence must not produce a second,
        // overlapping bare-keyword block.
        let text = "```mermaid\nflowchart TD\n  A --> B\n```";
        let blocks = detect(text);

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].start, 0);
        assert_eq!(blocks[0].end, text.len());
    }

    #[test]
    fn test_fence_wins_over_directive() {
        let text = "```plantuml\n@startuml\nA -> B\n@enduml\n```";
        let blocks = detect(text);

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].dialect, Dialect::PlantUml);
        assert_eq!(blocks[0].source, "@startuml\nA -> B\n@enduml");
    }

    #[test]
    fn test_contains_agrees_with_detect() {
        let cases = [
            "",
            "plain prose only",
            MIXED,
            "```mermaid\nflowchart TD\n  A --> B\n```",
            "pie\n\nNothing much.",            // probe hit, trivial block discarded
            "```mermaid\nunclosed fence",      // probe hit, no terminated block
            "The graph theory lecture notes.", // keyword mid-prose
            "@startuml\nA -> B\n@enduml",
        ];

        for text in cases {
            assert_eq!(
                contains_any_block(text),
                !detect(text).is_empty(),
                "probe disagrees with detect for {text:?}"
            );
        }
    }

    #[test]
    fn test_present_dialects() {
        assert_eq!(
            present_dialects(MIXED),
            vec![Dialect::Mermaid, Dialect::PlantUml]
        );
        assert_eq!(present_dialects("no diagrams here"), Vec::<Dialect>::new());
    }

    #[test]
    fn test_present_dialects_dedup() {
        let text = "graph TD\n  A --> B\n\nx\n\ngraph LR\n  C --> D";
        assert_eq!(present_dialects(text), vec![Dialect::Mermaid]);
    }

    #[test]
    fn test_empty_text() {
        assert!(detect("").is_empty());
        assert!(!contains_any_block(""));
    }
}
