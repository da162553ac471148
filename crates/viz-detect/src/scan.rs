//! Shared line scanning utilities for the convention scanners.

/// A line of input together with its byte span in the original text.
///
/// `start` points at the first byte of the line; `end` points one past the
/// last byte of the line content, excluding the trailing newline.
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

impl Line<'_> {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Split text into lines with byte offsets.
///
/// Handles both `\n` and `\r\n` terminators; the span never includes the
/// terminator so `end` offsets can be used directly as block boundaries.
pub fn lines(text: &str) -> Vec<Line<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    for segment in text.split_inclusive('\n') {
        let content = segment.strip_suffix('\n').unwrap_or(segment);
        let content = content.strip_suffix('\r').unwrap_or(content);
        out.push(Line {
            text: content,
            start,
            end: start + content.len(),
        });
        start += segment.len();
    }
    out
}
