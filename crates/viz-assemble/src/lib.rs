//! Reassembles a document after diagram rendering.
//!
//! Successful renders replace their source spans with `{{DIAGRAM_n}}`
//! tokens, spliced from the end of the text toward the start so earlier
//! offsets stay valid. Failed blocks keep their original source in place;
//! a partial document is better than a lost one.

use std::collections::BTreeMap;
use std::path::Path;

use viz_detect::Dialect;
use viz_engine::CapturedImage;
use viz_render::RenderedBlock;

mod html;

pub use html::{escape_html, to_markup};

#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("document is empty")]
    EmptyDocument,
    #[error("block span {start}..{end} does not fall on text boundaries")]
    InvalidSpan { start: usize, end: usize },
    #[error("assembled markup is empty")]
    EmptyMarkup,
}

/// Input flavor, derived from the source file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Markdown,
    PlainText,
    /// Text extracted out of a binary container (docx, pdf). The extraction
    /// itself happens upstream; by the time it reaches the pipeline it is
    /// plain text and flows through the same splice path.
    RichText,
}

impl DocumentKind {
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("md" | "markdown") => Self::Markdown,
            Some("docx" | "pdf" | "html") => Self::RichText,
            _ => Self::PlainText,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::PlainText => "text",
            Self::RichText => "rich-text",
        }
    }
}

/// A document accepted into the pipeline.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub kind: DocumentKind,
    pub title: String,
    pub text: String,
    /// Markup carried over from an upstream rich-text extractor, if any.
    /// The pipeline regenerates markup from the spliced text either way.
    pub styled_markup: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

/// Parses raw input text named `name`. The title comes from the first
/// `#` heading when present, otherwise from the file stem.
pub fn parse(name: &str, text: &str) -> Result<ParsedDocument, AssemblyError> {
    if text.trim().is_empty() {
        return Err(AssemblyError::EmptyDocument);
    }
    let kind = DocumentKind::from_name(name);
    let title = first_heading(text).unwrap_or_else(|| file_stem(name));

    let mut metadata = BTreeMap::new();
    metadata.insert("source_name".to_owned(), name.to_owned());
    metadata.insert("kind".to_owned(), kind.as_str().to_owned());
    metadata.insert("bytes".to_owned(), text.len().to_string());

    Ok(ParsedDocument {
        kind,
        title,
        text: text.to_owned(),
        styled_markup: None,
        metadata,
    })
}

fn first_heading(text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let trimmed = line.trim();
        trimmed
            .strip_prefix('#')
            .map(|rest| rest.trim_start_matches('#').trim().to_owned())
            .filter(|title| !title.is_empty())
    })
}

fn file_stem(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("document")
        .to_owned()
}

/// A rendered diagram ready for embedding, ordinal-aligned with the
/// `{{DIAGRAM_n}}` tokens in the assembled text.
#[derive(Debug, Clone)]
pub struct DiagramImage {
    pub dialect: Dialect,
    pub image: CapturedImage,
}

/// The spliced document: token-bearing text plus the images those tokens
/// refer to.
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    pub text: String,
    pub images: Vec<DiagramImage>,
    pub total_blocks: usize,
    pub rendered_count: usize,
}

fn token(ordinal: usize) -> String {
    format!("{{{{DIAGRAM_{ordinal}}}}}")
}

/// Replaces each successfully rendered block's span with its token.
/// Ordinals follow document order; splicing runs back to front.
pub fn assemble(text: &str, rendered: &[RenderedBlock]) -> Result<AssembledDocument, AssemblyError> {
    let mut successes: Vec<(&RenderedBlock, &CapturedImage)> = rendered
        .iter()
        .filter_map(|r| r.outcome.as_ref().ok().map(|image| (r, image)))
        .collect();
    successes.sort_by_key(|(r, _)| r.block.start);

    for (r, _) in &successes {
        let (start, end) = (r.block.start, r.block.end);
        if start > end
            || end > text.len()
            || !text.is_char_boundary(start)
            || !text.is_char_boundary(end)
        {
            return Err(AssemblyError::InvalidSpan { start, end });
        }
    }

    let mut out = text.to_owned();
    for (ordinal, (r, _)) in successes.iter().enumerate().rev() {
        let replacement = format!("\n\n{}\n\n", token(ordinal));
        out.replace_range(r.block.start..r.block.end, &replacement);
    }

    let images = successes
        .into_iter()
        .map(|(r, image)| DiagramImage {
            dialect: r.block.dialect,
            image: image.clone(),
        })
        .collect::<Vec<_>>();

    let rendered_count = images.len();
    tracing::debug!(
        total = rendered.len(),
        spliced = rendered_count,
        "document assembled"
    );
    Ok(AssembledDocument {
        text: out,
        images,
        total_blocks: rendered.len(),
        rendered_count,
    })
}

/// Checks the assembled document and its markup. Empty markup is an error;
/// zero spliced diagrams and leftover diagram source are logged but allowed,
/// since failed blocks legitimately keep their source in the text. The
/// authoritative leak check runs against the generated artifact, not here.
pub fn validate(doc: &AssembledDocument, markup: &str) -> Result<(), AssemblyError> {
    if markup.trim().is_empty() {
        return Err(AssemblyError::EmptyMarkup);
    }
    if doc.rendered_count == 0 {
        tracing::warn!("assembled document carries no rendered diagrams");
    }
    if viz_detect::contains_any_block(&doc.text) {
        tracing::warn!("diagram source still present in assembled text");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use viz_engine::ImageFormat;
    use viz_render::RenderFailure;

    fn image() -> CapturedImage {
        CapturedImage {
            bytes: vec![9, 9, 9],
            width: 4,
            height: 4,
            format: ImageFormat::Png,
        }
    }

    fn rendered(text: &str, span: &str, ok: bool) -> RenderedBlock {
        let start = text.find(span).unwrap();
        RenderedBlock {
            block: viz_detect::CodeBlock {
                dialect: Dialect::Mermaid,
                source: span.to_owned(),
                start,
                end: start + span.len(),
            },
            outcome: if ok {
                Ok(image())
            } else {
                Err(RenderFailure::EmptyOutput)
            },
        }
    }

    #[test]
    fn test_parse_title_from_heading() {
        let doc = parse("notes.md", "intro\n\n## Design Notes\n\nbody").unwrap();
        assert_eq!(doc.kind, DocumentKind::Markdown);
        assert_eq!(doc.title, "Design Notes");
        assert_eq!(doc.metadata["kind"], "markdown");
    }

    #[test]
    fn test_parse_title_from_file_stem() {
        let doc = parse("report.txt", "no headings here").unwrap();
        assert_eq!(doc.kind, DocumentKind::PlainText);
        assert_eq!(doc.title, "report");
    }

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(DocumentKind::from_name("a.MD"), DocumentKind::Markdown);
        assert_eq!(DocumentKind::from_name("a.docx"), DocumentKind::RichText);
        assert_eq!(DocumentKind::from_name("a.pdf"), DocumentKind::RichText);
        assert_eq!(DocumentKind::from_name("noext"), DocumentKind::PlainText);
    }

    #[test]
    fn test_parse_rejects_blank_input() {
        assert!(matches!(
            parse("x.md", "  \n\t\n"),
            Err(AssemblyError::EmptyDocument)
        ));
    }

    #[test]
    fn test_assemble_splices_tokens_in_document_order() {
        let text = "Intro\n\nAAAA\n\nmiddle\n\nBBBB\n\nend";
        let blocks = vec![rendered(text, "BBBB", true), rendered(text, "AAAA", true)];

        let doc = assemble(text, &blocks).unwrap();
        assert_eq!(doc.text, "Intro\n\n\n\n{{DIAGRAM_0}}\n\n\n\nmiddle\n\n\n\n{{DIAGRAM_1}}\n\n\n\nend");
        assert_eq!(doc.rendered_count, 2);
        assert_eq!(doc.total_blocks, 2);
    }

    #[test]
    fn test_failed_block_source_stays_in_place() {
        let text = "Intro\n\nAAAA\n\nBBBB\n\nend";
        let blocks = vec![rendered(text, "AAAA", false), rendered(text, "BBBB", true)];

        let doc = assemble(text, &blocks).unwrap();
        assert!(doc.text.contains("AAAA"));
        assert!(!doc.text.contains("BBBB"));
        assert!(doc.text.contains("{{DIAGRAM_0}}"));
        assert_eq!(doc.rendered_count, 1);
        assert_eq!(doc.images.len(), 1);
    }

    #[test]
    fn test_assemble_rejects_out_of_range_span() {
        let text = "short";
        let block = RenderedBlock {
            block: viz_detect::CodeBlock {
                dialect: Dialect::Mermaid,
                source: "x".to_owned(),
                start: 2,
                end: 99,
            },
            outcome: Ok(image()),
        };
        assert!(matches!(
            assemble(text, &[block]),
            Err(AssemblyError::InvalidSpan { start: 2, end: 99 })
        ));
    }

    #[test]
    fn test_splice_roundtrip_removes_every_fence() {
        let text = "# Doc\n\n```mermaid\nflowchart TD\n  A --> B\n```\n\nProse.\n\n```plantuml\n@startuml\nA -> B\n@enduml\n```\n";
        let blocks = viz_detect::detect(text);
        assert_eq!(blocks.len(), 2);

        let rendered: Vec<RenderedBlock> = blocks
            .into_iter()
            .map(|block| RenderedBlock {
                block,
                outcome: Ok(image()),
            })
            .collect();

        let doc = assemble(text, &rendered).unwrap();
        assert!(!doc.text.contains("```"));
        assert!(!doc.text.contains("@startuml"));
        assert_eq!(doc.text.matches("{{DIAGRAM_").count(), 2);
        assert!(doc.text.contains("{{DIAGRAM_0}}"));
        assert!(doc.text.contains("{{DIAGRAM_1}}"));
    }

    #[test]
    fn test_assemble_with_no_rendered_blocks_is_identity() {
        let text = "plain prose";
        let doc = assemble(text, &[]).unwrap();
        assert_eq!(doc.text, text);
        assert_eq!(doc.rendered_count, 0);
    }

    #[test]
    fn test_validate_rejects_empty_markup() {
        let doc = assemble("plain", &[]).unwrap();
        assert!(matches!(
            validate(&doc, "  "),
            Err(AssemblyError::EmptyMarkup)
        ));
        assert!(validate(&doc, "<html></html>").is_ok());
    }
}
