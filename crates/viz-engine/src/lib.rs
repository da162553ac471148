//! Headless rendering engine and text extraction boundaries for vizdoc.
//!
//! The pipeline depends on two external capabilities, both specified here as
//! traits so consumers never touch a concrete engine:
//!
//! - [`Engine`] / [`EnginePage`]: load markup, wait for a selector with a
//!   timeout, capture an element as a raster image, print a page to PDF
//! - [`TextExtractor`]: pull searchable text back out of a generated
//!   artifact, for validation
//!
//! [`SessionManager`] owns the process-wide engine session: lazily created
//! on first use, reused across calls, and released once via an idempotent
//! [`SessionManager::cleanup`].
//!
//! # Implementations
//!
//! - [`StaticEngine`] / [`StaticExtractor`]: deterministic in-memory
//!   implementations for tests and offline runs
//!
//! A production adapter (e.g. a CDP-driven browser) implements the same
//! traits and plugs in through the [`SessionManager`] factory.

mod error;
mod fake;
mod geometry;
mod session;

pub use error::{EngineError, ExtractError};
pub use fake::{StaticEngine, StaticExtractor};
pub use geometry::{PageFormat, PageGeometry};
pub use session::SessionManager;

use std::time::Duration;

/// Raster image format of a captured element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Png,
}

impl ImageFormat {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
        }
    }

    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
        }
    }
}

/// A captured element screenshot, sized to the element's bounding box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// Bounding-box width in pixels.
    pub width: u32,
    /// Bounding-box height in pixels.
    pub height: u32,
    /// Encoding of `bytes`.
    pub format: ImageFormat,
}

/// One isolated page (browsing context) inside an engine session.
///
/// Pages are cheap and single-use: each render or print call creates its
/// own page so concurrent documents sharing one session cannot corrupt each
/// other's state. Dropping the page releases it.
pub trait EnginePage {
    /// Load an HTML document and wait for network/resource quiescence.
    fn load_html(&mut self, html: &str) -> Result<(), EngineError>;

    /// Wait until an element matching `selector` exists, bounded by
    /// `timeout`. Expiry is reported as [`EngineError::Timeout`], never a
    /// hang.
    fn wait_for_selector(&mut self, selector: &str, timeout: Duration)
    -> Result<(), EngineError>;

    /// Capture the element matching `selector` as a raster image sized to
    /// its bounding box.
    fn capture_element(&mut self, selector: &str) -> Result<CapturedImage, EngineError>;

    /// Produce a paginated PDF of the loaded document.
    fn print_to_pdf(&mut self, geometry: &PageGeometry) -> Result<Vec<u8>, EngineError>;
}

/// A live headless engine session.
///
/// The session is shared across a batch of renders and across documents;
/// isolation happens at the page level via [`Engine::new_page`].
pub trait Engine: Send + Sync {
    /// Open a fresh, isolated page.
    fn new_page(&self) -> Result<Box<dyn EnginePage>, EngineError>;

    /// Tear the session down. Called once at process shutdown by
    /// [`SessionManager::cleanup`]; must be safe to call more than once.
    fn shutdown(&self);
}

/// Text extraction from a generated artifact.
///
/// Used both for the searchability check (any extractable text at all) and
/// for leak detection (diagram source or placeholder tokens surviving into
/// the shipped artifact).
pub trait TextExtractor: Send + Sync {
    /// Extract all text content from the artifact bytes.
    fn extract_text(&self, artifact: &[u8]) -> Result<String, ExtractError>;

    /// Number of pages in the artifact, when the format can be
    /// introspected. `None` is not an error; statistics degrade to zero.
    fn page_count(&self, artifact: &[u8]) -> Option<u32>;
}
