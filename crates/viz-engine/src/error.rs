//! Engine and extraction error types.

use std::time::Duration;

/// Failure of the headless engine or one of its pages.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    /// The engine session could not be started or has gone away.
    #[error("engine session unavailable: {0}")]
    Unavailable(String),

    /// A bounded wait for `selector` expired.
    #[error("timed out after {waited:?} waiting for selector '{selector}'")]
    Timeout { selector: String, waited: Duration },

    /// A capture produced a zero-byte or zero-dimension image.
    #[error("capture produced empty output")]
    EmptyCapture,

    /// Any other page-level failure (navigation, scripting, printing).
    #[error("page error: {0}")]
    Page(String),
}

/// Failure to extract text from an artifact.
#[derive(Debug, Clone, thiserror::Error)]
#[error("text extraction failed: {0}")]
pub struct ExtractError(pub String);
