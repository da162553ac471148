//! Deterministic in-memory engine and extractor.
//!
//! [`StaticEngine`] stands in for a real headless engine in tests and
//! offline runs: captures return canned PNG bytes, printing embeds the
//! loaded HTML into the artifact, and failure modes (unavailable session,
//! selector timeouts, empty captures) can be scripted per content marker.
//! [`StaticExtractor`] recovers text from those artifacts by stripping the
//! embedded markup, so leak and searchability validation behave like they
//! would against a real artifact.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{EngineError, ExtractError};
use crate::geometry::PageGeometry;
use crate::{CapturedImage, Engine, EnginePage, ImageFormat, TextExtractor};

/// Marker prefixed to artifacts produced by [`StaticEngine`].
const ARTIFACT_PREFIX: &[u8] = b"%PDF-static\n";

#[derive(Default)]
struct Shared {
    /// HTML documents loaded into pages, in order.
    loaded_html: Mutex<Vec<String>>,
    shutdowns: AtomicUsize,
    fail_new_page: bool,
    /// Pages whose HTML contains one of these markers time out on
    /// `wait_for_selector`.
    timeout_markers: Vec<String>,
    /// Pages whose HTML contains one of these markers capture a
    /// zero-dimension image.
    empty_markers: Vec<String>,
    capture_size: (u32, u32),
}

/// Deterministic in-memory [`Engine`].
#[derive(Clone)]
pub struct StaticEngine {
    shared: Arc<Shared>,
}

impl Default for StaticEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                capture_size: (640, 480),
                ..Shared::default()
            }),
        }
    }

    fn shared_mut(&mut self) -> &mut Shared {
        Arc::get_mut(&mut self.shared).expect("configure StaticEngine before sharing it")
    }

    /// Every `new_page` call fails with [`EngineError::Unavailable`].
    #[must_use]
    pub fn fail_page_creation(mut self) -> Self {
        self.shared_mut().fail_new_page = true;
        self
    }

    /// Pages whose loaded HTML contains `marker` time out on
    /// `wait_for_selector`.
    #[must_use]
    pub fn timeout_when_contains(mut self, marker: impl Into<String>) -> Self {
        self.shared_mut().timeout_markers.push(marker.into());
        self
    }

    /// Pages whose loaded HTML contains `marker` capture a zero-dimension
    /// image.
    #[must_use]
    pub fn empty_capture_when_contains(mut self, marker: impl Into<String>) -> Self {
        self.shared_mut().empty_markers.push(marker.into());
        self
    }

    /// Size reported for captured elements.
    #[must_use]
    pub fn capture_size(mut self, width: u32, height: u32) -> Self {
        self.shared_mut().capture_size = (width, height);
        self
    }

    /// HTML documents loaded so far, in order.
    #[must_use]
    pub fn loaded_html(&self) -> Vec<String> {
        self.shared.loaded_html.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Number of `shutdown` calls observed.
    #[must_use]
    pub fn shutdown_count(&self) -> usize {
        self.shared.shutdowns.load(Ordering::SeqCst)
    }
}

impl Engine for StaticEngine {
    fn new_page(&self) -> Result<Box<dyn EnginePage>, EngineError> {
        if self.shared.fail_new_page {
            return Err(EngineError::Unavailable(
                "engine configured as unavailable".to_owned(),
            ));
        }
        Ok(Box::new(StaticPage {
            shared: Arc::clone(&self.shared),
            html: None,
        }))
    }

    fn shutdown(&self) {
        self.shared.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}

struct StaticPage {
    shared: Arc<Shared>,
    html: Option<String>,
}

impl StaticPage {
    fn html_matches(&self, markers: &[String]) -> bool {
        self.html
            .as_ref()
            .is_some_and(|html| markers.iter().any(|m| html.contains(m)))
    }
}

impl EnginePage for StaticPage {
    fn load_html(&mut self, html: &str) -> Result<(), EngineError> {
        if let Ok(mut loaded) = self.shared.loaded_html.lock() {
            loaded.push(html.to_owned());
        }
        self.html = Some(html.to_owned());
        Ok(())
    }

    fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), EngineError> {
        if self.html.is_none() {
            return Err(EngineError::Page("no document loaded".to_owned()));
        }
        if self.html_matches(&self.shared.timeout_markers) {
            return Err(EngineError::Timeout {
                selector: selector.to_owned(),
                waited: timeout,
            });
        }
        Ok(())
    }

    fn capture_element(&mut self, _selector: &str) -> Result<CapturedImage, EngineError> {
        if self.html.is_none() {
            return Err(EngineError::Page("no document loaded".to_owned()));
        }
        let (width, height) = if self.html_matches(&self.shared.empty_markers) {
            (0, 0)
        } else {
            self.shared.capture_size
        };
        Ok(CapturedImage {
            bytes: b"\x89PNG\r\n\x1a\nstatic-capture".to_vec(),
            width,
            height,
            format: ImageFormat::Png,
        })
    }

    fn print_to_pdf(&mut self, _geometry: &PageGeometry) -> Result<Vec<u8>, EngineError> {
        let html = self
            .html
            .as_ref()
            .ok_or_else(|| EngineError::Page("no document loaded".to_owned()))?;
        let mut bytes = ARTIFACT_PREFIX.to_vec();
        bytes.extend_from_slice(html.as_bytes());
        Ok(bytes)
    }
}

/// Deterministic [`TextExtractor`] counterpart to [`StaticEngine`].
///
/// Recovers text from `StaticEngine` artifacts by stripping markup from the
/// embedded HTML. Can also be pinned to fixed text or a fixed failure.
#[derive(Default)]
pub struct StaticExtractor {
    fixed_text: Option<String>,
    fail: bool,
}

impl StaticExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Always return `text` regardless of artifact content.
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            fixed_text: Some(text.into()),
            fail: false,
        }
    }

    /// Always fail extraction.
    #[must_use]
    pub fn with_failure() -> Self {
        Self {
            fixed_text: None,
            fail: true,
        }
    }
}

impl TextExtractor for StaticExtractor {
    fn extract_text(&self, artifact: &[u8]) -> Result<String, ExtractError> {
        if self.fail {
            return Err(ExtractError("extractor configured to fail".to_owned()));
        }
        if let Some(text) = &self.fixed_text {
            return Ok(text.clone());
        }
        let html = artifact
            .strip_prefix(ARTIFACT_PREFIX)
            .ok_or_else(|| ExtractError("not a static artifact".to_owned()))?;
        let html = String::from_utf8_lossy(html);
        Ok(strip_markup(&html))
    }

    fn page_count(&self, artifact: &[u8]) -> Option<u32> {
        artifact.starts_with(ARTIFACT_PREFIX).then_some(1)
    }
}

/// Naive markup-to-text conversion: drops `<head>`, tags, and data URIs,
/// and unescapes the entities the assembler produces.
fn strip_markup(html: &str) -> String {
    let body = html
        .split_once("<body>")
        .map_or(html, |(_, rest)| rest);

    let mut text = String::with_capacity(body.len());
    let mut in_tag = false;
    for c in body.chars() {
        match c {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                // Tag boundaries separate words in extracted text.
                if !text.ends_with(char::is_whitespace) {
                    text.push(' ');
                }
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_owned()
}
