//! `@startuml` / `@enduml` directive scanner.
//!
//! The alternate explicit-fence convention for the `PlantUML` dialect:
//! blocks delimited by a directive pair instead of backtick fences. Matched
//! independently of the backtick scanner; overlap resolution keeps the
//! backtick match when both fire on the same region.

use crate::CodeBlock;
use crate::dialect::Dialect;
use crate::scan::{Line, lines};

enum State {
    SeekingStart,
    InBody { block_start: usize, body_start: usize },
}

fn is_start_directive(line: &Line<'_>) -> bool {
    let trimmed = line.text.trim_start();
    trimmed == "@startuml" || trimmed.starts_with("@startuml ")
}

fn is_end_directive(line: &Line<'_>) -> bool {
    line.text.trim() == "@enduml"
}

/// Scan for directive-delimited `PlantUML` blocks.
pub fn scan(text: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut state = State::SeekingStart;

    for line in lines(text) {
        match state {
            State::SeekingStart => {
                if is_start_directive(&line) {
                    state = State::InBody {
                        block_start: line.start,
                        body_start: line.end,
                    };
                }
            }
            State::InBody {
                block_start,
                body_start,
            } => {
                if is_end_directive(&line) {
                    let source = text[body_start..line.start].trim().to_owned();
                    blocks.push(CodeBlock {
                        dialect: Dialect::PlantUml,
                        source,
                        start: block_start,
                        end: line.end,
                    });
                    state = State::SeekingStart;
                }
            }
        }
    }

    blocks
}
