//! Turns detected diagram blocks into raster images.
//!
//! Rendering is batch-oriented and failure-isolated: each block gets a fresh
//! engine page, and one block failing to render never aborts the batch. The
//! output preserves the input's length and order so the assembler can line
//! results back up with their source spans.

use std::time::Duration;

use viz_detect::{CodeBlock, Dialect};
use viz_engine::{CapturedImage, Engine, EngineError};

mod page;
pub mod plantuml;

/// Why a single block failed to render. Carried per block so the caller can
/// report partial results.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RenderFailure {
    #[error("engine unavailable: {0}")]
    EngineUnavailable(String),
    #[error("timed out after {waited:?} waiting for {selector}")]
    Timeout { selector: String, waited: Duration },
    #[error("engine produced no image output")]
    EmptyOutput,
    #[error("page error: {0}")]
    Page(String),
    #[error("source encoding failed: {0}")]
    Encoding(String),
}

impl From<EngineError> for RenderFailure {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Unavailable(msg) => Self::EngineUnavailable(msg),
            EngineError::Timeout { selector, waited } => Self::Timeout { selector, waited },
            EngineError::EmptyCapture => Self::EmptyOutput,
            EngineError::Page(msg) => Self::Page(msg),
        }
    }
}

/// One block's render outcome, paired with the block it came from.
#[derive(Debug, Clone)]
pub struct RenderedBlock {
    pub block: CodeBlock,
    pub outcome: Result<CapturedImage, RenderFailure>,
}

impl RenderedBlock {
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        self.outcome.is_ok()
    }

    #[must_use]
    pub fn image(&self) -> Option<&CapturedImage> {
        self.outcome.as_ref().ok()
    }

    #[must_use]
    pub fn failure(&self) -> Option<&RenderFailure> {
        self.outcome.as_ref().err()
    }
}

/// Batch renderer. Holds the per-block wait timeout and the remote PlantUML
/// server base URL.
pub struct Renderer {
    timeout: Duration,
    plantuml_url: String,
}

impl Renderer {
    #[must_use]
    pub fn new(timeout: Duration, plantuml_url: impl Into<String>) -> Self {
        Self {
            timeout,
            plantuml_url: plantuml_url.into(),
        }
    }

    /// Renders every block sequentially. The returned vector has the same
    /// length and order as `blocks`; failures are recorded in place.
    pub fn render_batch(&self, engine: &dyn Engine, blocks: Vec<CodeBlock>) -> Vec<RenderedBlock> {
        let total = blocks.len();
        let mut out = Vec::with_capacity(total);
        for (index, block) in blocks.into_iter().enumerate() {
            let outcome = self.render_one(engine, &block);
            if let Err(failure) = &outcome {
                tracing::warn!(
                    index,
                    dialect = block.dialect.as_str(),
                    %failure,
                    "diagram render failed"
                );
            }
            out.push(RenderedBlock { block, outcome });
        }
        let rendered = out.iter().filter(|r| r.is_rendered()).count();
        tracing::info!(rendered, total, "diagram batch rendered");
        out
    }

    /// Renders a single block, dispatching on its dialect.
    pub fn render_one(
        &self,
        engine: &dyn Engine,
        block: &CodeBlock,
    ) -> Result<CapturedImage, RenderFailure> {
        let (html, wait_selector, capture_selector) = match block.dialect {
            Dialect::Mermaid => (
                page::mermaid_page(&block.source),
                page::MERMAID_WAIT_SELECTOR,
                page::MERMAID_CAPTURE_SELECTOR,
            ),
            Dialect::PlantUml => {
                let url = plantuml::diagram_url(&self.plantuml_url, &block.source)
                    .map_err(|err| RenderFailure::Encoding(err.to_string()))?;
                (
                    page::plantuml_page(&url),
                    page::PLANTUML_WAIT_SELECTOR,
                    page::PLANTUML_CAPTURE_SELECTOR,
                )
            }
        };

        let mut page = engine.new_page()?;
        page.load_html(&html)?;
        page.wait_for_selector(wait_selector, self.timeout)?;
        let image = page.capture_element(capture_selector)?;
        if image.bytes.is_empty() || image.width == 0 || image.height == 0 {
            return Err(RenderFailure::EmptyOutput);
        }
        tracing::debug!(
            dialect = block.dialect.as_str(),
            width = image.width,
            height = image.height,
            "diagram rendered"
        );
        Ok(image)
    }
}
