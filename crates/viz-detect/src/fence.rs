//! Backtick fence scanner.
//!
//! Recognizes the explicit-fence convention: an opening ` ``` ` fence tagged
//! with a dialect name, closed by a bare ` ``` ` fence. Implemented as a
//! two-state line machine rather than a multiline regex so offsets stay
//! exact byte positions.

use crate::CodeBlock;
use crate::dialect::Dialect;
use crate::scan::{Line, lines};

enum State {
    SeekingStart,
    InBody {
        dialect: Dialect,
        fence_start: usize,
        body_start: usize,
    },
}

/// Parse the dialect from an opening fence line, if it is one.
fn opening_fence(line: &Line<'_>) -> Option<Dialect> {
    let trimmed = line.text.trim_start();
    let info = trimmed.strip_prefix("```")?;
    Dialect::parse(info.trim())
}

fn closing_fence(line: &Line<'_>) -> bool {
    line.text.trim() == "```"
}

/// Scan for backtick-fenced diagram blocks.
///
/// An unterminated fence at end of input is discarded; the fence alone is
/// not evidence of a diagram.
pub fn scan(text: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut state = State::SeekingStart;

    for line in lines(text) {
        match state {
            State::SeekingStart => {
                if let Some(dialect) = opening_fence(&line) {
                    state = State::InBody {
                        dialect,
                        fence_start: line.start,
                        body_start: line.end,
                    };
                }
            }
            State::InBody {
                dialect,
                fence_start,
                body_start,
            } => {
                if closing_fence(&line) {
                    let source = text[body_start..line.start].trim().to_owned();
                    blocks.push(CodeBlock {
                        dialect,
                        source,
                        start: fence_start,
                        end: line.end,
                    });
                    state = State::SeekingStart;
                }
            }
        }
    }

    blocks
}
