//! Dash fence scanner.
//!
//! Recognizes `----`-delimited Mermaid blocks: a `----` line immediately
//! followed by a line opening with a diagram-type keyword, closed by the
//! next `----` line. Some authoring tools emit this fencing instead of
//! backticks, so it is matched as its own pass.

use crate::CodeBlock;
use crate::dialect::{Dialect, mermaid_keyword_at_line_start};
use crate::scan::{Line, lines};

enum State {
    SeekingStart,
    /// Saw a `----` line; the next line decides whether a block opens.
    AtFence { fence_start: usize },
    InBody { fence_start: usize, body_start: usize },
}

fn is_dash_fence(line: &Line<'_>) -> bool {
    line.text.trim() == "----"
}

/// Scan for dash-fenced Mermaid blocks.
pub fn scan(text: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut state = State::SeekingStart;

    for line in lines(text) {
        state = match state {
            State::SeekingStart => {
                if is_dash_fence(&line) {
                    State::AtFence {
                        fence_start: line.start,
                    }
                } else {
                    State::SeekingStart
                }
            }
            State::AtFence { fence_start } => {
                if mermaid_keyword_at_line_start(line.text).is_some() {
                    State::InBody {
                        fence_start,
                        body_start: line.start,
                    }
                } else if is_dash_fence(&line) {
                    // A new fence resets the candidate opening.
                    State::AtFence {
                        fence_start: line.start,
                    }
                } else {
                    State::SeekingStart
                }
            }
            State::InBody {
                fence_start,
                body_start,
            } => {
                if is_dash_fence(&line) {
                    let source = text[body_start..line.start].trim().to_owned();
                    blocks.push(CodeBlock {
                        dialect: Dialect::Mermaid,
                        source,
                        start: fence_start,
                        end: line.end,
                    });
                    State::SeekingStart
                } else {
                    State::InBody {
                        fence_start,
                        body_start,
                    }
                }
            }
        };
    }

    blocks
}
