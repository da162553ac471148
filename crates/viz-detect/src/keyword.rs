//! Bare keyword scanner.
//!
//! Recognizes unfenced Mermaid blocks: a line opening with a diagram-type
//! keyword, with the body running until a stopping condition. This is a
//! best-effort heuristic, not a grammar; documents that interleave diagram
//! bodies and prose without fencing are inherently ambiguous and the rules
//! here favor keeping blank-line-separated diagram sections together.
//!
//! Stopping conditions:
//! - another keyword opener, a `#` heading, a `----` fence, or an explicit
//!   fence/directive opener;
//! - a blank line whose following line does not look like diagram
//!   continuation syntax (indent >= 4, arrow/list/pipe markers, a known
//!   diagram-internal keyword, a bare identifier, or a node definition);
//! - two consecutive blank lines.

use std::sync::LazyLock;

use regex::Regex;

use crate::CodeBlock;
use crate::dialect::{Dialect, mermaid_keyword_at_line_start};
use crate::scan::{Line, lines};

/// Keywords that appear inside diagram bodies (participants, annotations,
/// block terminators, gantt/pie structure) and mark a line as continuation.
const BODY_KEYWORDS: &[&str] = &[
    "participant",
    "actor",
    "note",
    "end",
    "else",
    "alt",
    "opt",
    "loop",
    "par",
    "rect",
    "activate",
    "deactivate",
    "autonumber",
    "section",
    "title",
    "subgraph",
    "state",
    "class",
    "click",
    "style",
    "linkStyle",
    "classDef",
    "direction",
    "dateFormat",
    "axisFormat",
    "excludes",
];

/// A single bare identifier, e.g. a node id on its own line.
static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").unwrap());

/// A node definition with a shape bracket, e.g. `A[Start]` or `B{Choice}`.
static NODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+\s*[\[({]").unwrap());

/// Whether a line looks like diagram body syntax rather than prose.
fn is_continuation(line: &str) -> bool {
    if line.starts_with("    ") || line.starts_with('\t') {
        return true;
    }
    let trimmed = line.trim();
    if trimmed.contains("-->")
        || trimmed.contains("->")
        || trimmed.contains("=>")
        || trimmed.contains("---")
    {
        return true;
    }
    if trimmed.starts_with('|')
        || trimmed.starts_with("- ")
        || trimmed.starts_with("* ")
        || trimmed.starts_with("+ ")
        || trimmed.starts_with("%%")
        || trimmed.starts_with('"')
    {
        return true;
    }
    let first_word = trimmed.split_whitespace().next().unwrap_or("");
    if BODY_KEYWORDS.contains(&first_word) {
        return true;
    }
    IDENT_RE.is_match(trimmed) || NODE_RE.is_match(trimmed)
}

/// Whether a line unconditionally terminates a bare block.
fn is_terminator(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with('#')
        || trimmed.trim_end() == "----"
        || trimmed.starts_with("```")
        || trimmed.starts_with("@startuml")
}

fn close_block(text: &str, start: usize, end: usize, min_len: usize, blocks: &mut Vec<CodeBlock>) {
    let source = text[start..end].trim();
    if source.len() < min_len {
        // Too short to be a diagram; a stray keyword in prose.
        return;
    }
    blocks.push(CodeBlock {
        dialect: Dialect::Mermaid,
        source: source.to_owned(),
        start,
        end,
    });
}

/// Scan for bare (unfenced) Mermaid keyword blocks. Blocks whose trimmed
/// source is shorter than `min_len` bytes are discarded as prose noise.
pub fn scan(text: &str, min_len: usize) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let all: Vec<Line<'_>> = lines(text);

    // (block start, end of last body line)
    let mut open: Option<(usize, usize)> = None;
    let mut i = 0;

    while i < all.len() {
        let line = all[i];

        match open {
            None => {
                if !line.is_blank() && mermaid_keyword_at_line_start(line.text).is_some() {
                    open = Some((line.start, line.end));
                }
            }
            Some((start, last_end)) => {
                if line.is_blank() {
                    let next = all.get(i + 1);
                    let continues =
                        next.is_some_and(|n| !n.is_blank() && is_continuation(n.text));
                    if !continues {
                        close_block(text, start, last_end, min_len, &mut blocks);
                        open = None;
                    }
                } else if mermaid_keyword_at_line_start(line.text).is_some() {
                    // A new keyword opener closes the current block and
                    // immediately starts the next one.
                    close_block(text, start, last_end, min_len, &mut blocks);
                    open = Some((line.start, line.end));
                } else if is_terminator(line.text) {
                    close_block(text, start, last_end, min_len, &mut blocks);
                    open = None;
                } else {
                    open = Some((start, line.end));
                }
            }
        }
        i += 1;
    }

    if let Some((start, last_end)) = open {
        close_block(text, start, last_end, min_len, &mut blocks);
    }

    blocks
}
