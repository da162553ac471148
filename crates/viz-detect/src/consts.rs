//! Internal constants for block detection.

/// Minimum trimmed length for a bare keyword-delimited block.
///
/// Shorter matches are stray keywords in prose, not diagrams.
pub const MIN_BARE_BLOCK_LEN: usize = 10;
