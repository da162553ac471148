//! The document pipeline: detect, render, assemble, generate, validate.
//!
//! [`PipelineController`] owns the engine session and sequences the four
//! stages for one document at a time. Render failures are soft (the
//! document continues with the failed block's source left in place);
//! everything after assembly is hard, since a malformed artifact must never
//! be handed to storage.

use std::time::{Duration, Instant};

use viz_artifact::{Artifact, ValidationError, ValidationReport};
use viz_assemble::{AssemblyError, ParsedDocument};
use viz_config::{Config, ConfigError};
use viz_detect::Dialect;
use viz_engine::{PageGeometry, SessionManager, TextExtractor};
use viz_render::{RenderFailure, RenderedBlock, Renderer};

pub use viz_artifact::GenerationError;

/// Terminal pipeline errors. Per-block render failures are not here; they
/// ride along in [`ProcessedDocument::failures`] unless every block failed.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("document could not be parsed: {0}")]
    Parse(String),
    #[error("no diagram blocks detected in document")]
    NoBlocksDetected,
    #[error("all {} diagram blocks failed to render", failures.len())]
    AllRendersFailed { failures: Vec<BlockFailure> },
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    ArtifactValidation(#[from] ValidationError),
}

/// One block that failed to render, reported alongside a successful run.
#[derive(Debug, Clone)]
pub struct BlockFailure {
    /// Index of the block in detection order.
    pub index: usize,
    pub dialect: Dialect,
    pub reason: RenderFailure,
}

/// Reporting figures for one processed document.
#[derive(Debug, Clone)]
pub struct ProcessStats {
    pub blocks_found: usize,
    pub blocks_rendered: usize,
    pub page_count: u32,
    pub byte_size: usize,
    pub elapsed: Duration,
    pub is_text_searchable: bool,
}

/// Result of a successful pipeline run. `failures` is non-empty when some
/// blocks failed but at least one rendered.
#[derive(Debug)]
pub struct ProcessedDocument {
    pub artifact: Artifact,
    pub report: ValidationReport,
    pub stats: ProcessStats,
    pub failures: Vec<BlockFailure>,
}

/// Owns the engine session and drives documents through the stages.
pub struct PipelineController {
    renderer: Renderer,
    geometry: PageGeometry,
    settle: Duration,
    min_block_len: usize,
    session: SessionManager,
    extractor: Box<dyn TextExtractor>,
}

impl PipelineController {
    /// Builds a controller from configuration.
    ///
    /// # Errors
    /// Returns `ConfigError::Validation` when the page section does not
    /// resolve to a geometry.
    pub fn new(
        config: &Config,
        session: SessionManager,
        extractor: Box<dyn TextExtractor>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            renderer: Renderer::new(config.render.timeout(), &config.remote.plantuml_url),
            geometry: config.page.geometry()?,
            settle: config.render.settle_delay(),
            min_block_len: config.render.min_block_len,
            session,
            extractor,
        })
    }

    /// Parses raw input text and runs it through the pipeline.
    pub fn process_text(&self, name: &str, text: &str) -> Result<ProcessedDocument, PipelineError> {
        let parsed = viz_assemble::parse(name, text)
            .map_err(|err| PipelineError::Parse(err.to_string()))?;
        self.process_document(&parsed)
    }

    /// Runs one parsed document through detect, render, assemble, and
    /// generate, returning the validated artifact.
    pub fn process_document(
        &self,
        doc: &ParsedDocument,
    ) -> Result<ProcessedDocument, PipelineError> {
        let started = Instant::now();
        tracing::info!(title = %doc.title, kind = doc.kind.as_str(), "processing document");

        let blocks = viz_detect::detect_with_min_len(&doc.text, self.min_block_len);
        if blocks.is_empty() {
            return Err(PipelineError::NoBlocksDetected);
        }
        let blocks_found = blocks.len();

        let engine = match self.session.acquire() {
            Ok(engine) => engine,
            Err(err) => {
                // No session at all: every block fails the same way.
                let failures = blocks
                    .iter()
                    .enumerate()
                    .map(|(index, block)| BlockFailure {
                        index,
                        dialect: block.dialect,
                        reason: RenderFailure::EngineUnavailable(err.to_string()),
                    })
                    .collect();
                return Err(PipelineError::AllRendersFailed { failures });
            }
        };

        let rendered = self.renderer.render_batch(engine.as_ref(), blocks);
        let failures = collect_failures(&rendered);
        if failures.len() == blocks_found {
            return Err(PipelineError::AllRendersFailed { failures });
        }

        let assembled = viz_assemble::assemble(&doc.text, &rendered)?;
        let markup = viz_assemble::to_markup(&doc.title, &assembled);
        viz_assemble::validate(&assembled, &markup)?;

        let artifact = viz_artifact::generate(engine.as_ref(), &markup, &self.geometry, self.settle)?;
        let report = viz_artifact::validate(&artifact, self.extractor.as_ref())?;
        let artifact_stats = viz_artifact::statistics(&artifact, self.extractor.as_ref());

        let stats = ProcessStats {
            blocks_found,
            blocks_rendered: assembled.rendered_count,
            page_count: artifact_stats.page_count,
            byte_size: artifact_stats.byte_size,
            elapsed: started.elapsed(),
            is_text_searchable: report.is_text_searchable,
        };
        tracing::info!(
            blocks_found = stats.blocks_found,
            blocks_rendered = stats.blocks_rendered,
            byte_size = stats.byte_size,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "document processed"
        );

        Ok(ProcessedDocument {
            artifact,
            report,
            stats,
            failures,
        })
    }

    /// Releases the engine session. Safe to call repeatedly.
    pub fn cleanup(&self) {
        self.session.cleanup();
    }
}

fn collect_failures(rendered: &[RenderedBlock]) -> Vec<BlockFailure> {
    rendered
        .iter()
        .enumerate()
        .filter_map(|(index, r)| {
            r.outcome.as_ref().err().map(|reason| BlockFailure {
                index,
                dialect: r.block.dialect,
                reason: reason.clone(),
            })
        })
        .collect()
}
