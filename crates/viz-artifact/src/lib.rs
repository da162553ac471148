//! Final artifact generation and post-generation validation.
//!
//! The artifact is produced by printing the assembled markup through an
//! engine page. Validation is independent of generation: the artifact's
//! text is re-extracted and checked for searchability and for leaked
//! diagram source or placeholder tokens. A leak here is a defect, not a
//! degraded result, so validation failures are fatal.

use std::time::Duration;

use viz_engine::{Engine, EngineError, ExtractError, PageGeometry, TextExtractor};

/// Fence and directive markers that must never survive into extractable
/// text. Bare-keyword source from failed renders is allowed to remain.
const LEAK_MARKERS: [&str; 4] = ["```mermaid", "```plantuml", "@startuml", "@enduml"];

const PLACEHOLDER_MARKER: &str = "{{DIAGRAM_";

#[derive(Debug, Clone, thiserror::Error)]
#[error("artifact generation failed: {0}")]
pub struct GenerationError(#[from] pub EngineError);

#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("artifact text extraction failed: {0}")]
    Extraction(#[from] ExtractError),
    #[error("artifact contains no extractable text")]
    NotSearchable,
    #[error("diagram source marker {0:?} present in artifact text")]
    SourceLeak(&'static str),
    #[error("placeholder tokens present in artifact text")]
    PlaceholderLeak,
}

/// The terminal output of the pipeline, handed to the storage collaborator.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub bytes: Vec<u8>,
}

impl Artifact {
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.bytes.len()
    }
}

/// Outcome of [`validate`]. Only well-formed artifacts get a report;
/// defects surface as [`ValidationError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub is_text_searchable: bool,
    pub contains_leaked_source: bool,
    pub extracted_chars: usize,
}

/// Size and page-count figures for reporting. Never fails: an artifact the
/// extractor cannot open still has a byte size.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactStats {
    pub page_count: u32,
    pub byte_size: usize,
    pub byte_size_mb: f64,
}

/// Prints `markup` to an artifact. `settle` gives embedded images time to
/// lay out before printing; pass zero to skip the delay.
pub fn generate(
    engine: &dyn Engine,
    markup: &str,
    geometry: &PageGeometry,
    settle: Duration,
) -> Result<Artifact, GenerationError> {
    let mut page = engine.new_page()?;
    page.load_html(markup)?;
    if !settle.is_zero() {
        std::thread::sleep(settle);
    }
    let bytes = page.print_to_pdf(geometry)?;
    tracing::info!(bytes = bytes.len(), "artifact generated");
    Ok(Artifact { bytes })
}

/// Re-extracts the artifact's text and checks it for searchability and
/// leaks.
pub fn validate(
    artifact: &Artifact,
    extractor: &dyn TextExtractor,
) -> Result<ValidationReport, ValidationError> {
    let text = extractor.extract_text(&artifact.bytes)?;
    if text.trim().is_empty() {
        return Err(ValidationError::NotSearchable);
    }

    let lowered = text.to_ascii_lowercase();
    for marker in LEAK_MARKERS {
        if lowered.contains(marker) {
            tracing::error!(marker, "diagram source leaked into artifact text");
            return Err(ValidationError::SourceLeak(marker));
        }
    }
    if text.contains(PLACEHOLDER_MARKER) {
        return Err(ValidationError::PlaceholderLeak);
    }

    tracing::debug!(extracted_chars = text.len(), "artifact validated");
    Ok(ValidationReport {
        is_text_searchable: true,
        contains_leaked_source: false,
        extracted_chars: text.len(),
    })
}

/// Collects reporting figures for `artifact`. Page count falls back to
/// zero when the extractor cannot open the bytes.
#[must_use]
pub fn statistics(artifact: &Artifact, extractor: &dyn TextExtractor) -> ArtifactStats {
    let byte_size = artifact.byte_size();
    ArtifactStats {
        page_count: extractor.page_count(&artifact.bytes).unwrap_or(0),
        byte_size,
        byte_size_mb: byte_size as f64 / (1024.0 * 1024.0),
    }
}
