//! Print-ready markup generation.
//!
//! The assembled text is paragraph-oriented plain text with `{{DIAGRAM_n}}`
//! tokens standing in for rendered diagrams. This module turns it into a
//! self-contained HTML page: headings from `#` prefixes, paragraphs from
//! blank-line separation, and each token expanded to a figure with the image
//! embedded as a base64 data URI.

use std::fmt::Write as _;
use std::sync::LazyLock;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use regex::Regex;

use crate::AssembledDocument;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").unwrap());

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{\{DIAGRAM_(\d+)\}\}$").unwrap());

/// Stylesheet applied to every generated page.
const PAGE_CSS: &str = r"
    body {
      font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif;
      line-height: 1.6;
      max-width: 800px;
      margin: 40px auto;
      padding: 20px;
      color: #333;
    }
    figure.diagram {
      margin: 20px 0;
    }
    figure.diagram img {
      max-width: 100%;
      height: auto;
      display: block;
      border: 1px solid #ddd;
      border-radius: 4px;
      padding: 5px;
      background: white;
    }
    h1, h2, h3, h4, h5, h6 {
      margin-top: 24px;
      margin-bottom: 16px;
      font-weight: 600;
      line-height: 1.25;
    }
    p {
      margin-bottom: 16px;
    }
";

#[must_use]
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

/// Renders `doc` as a complete HTML page titled `title`.
#[must_use]
pub fn to_markup(title: &str, doc: &AssembledDocument) -> String {
    let mut body = String::new();
    let escaped = escape_html(&doc.text);
    for paragraph in escaped.split("\n\n") {
        let trimmed = paragraph.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(caps) = TOKEN_RE.captures(trimmed) {
            if let Some(figure) = diagram_figure(doc, &caps[1]) {
                body.push_str(&figure);
            }
            continue;
        }
        if let Some(caps) = HEADING_RE.captures(trimmed) {
            let level = caps[1].len();
            let _ = writeln!(body, "  <h{level}>{}</h{level}>", &caps[2]);
            continue;
        }
        let _ = writeln!(body, "  <p>{}</p>", trimmed.replace('\n', "<br>"));
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"UTF-8\">\n  <title>{}</title>\n  <style>{PAGE_CSS}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        escape_html(title)
    )
}

fn diagram_figure(doc: &AssembledDocument, ordinal: &str) -> Option<String> {
    let index: usize = ordinal.parse().ok()?;
    let diagram = doc.images.get(index)?;
    let encoded = BASE64_STANDARD.encode(&diagram.image.bytes);
    Some(format!(
        "  <figure class=\"diagram\">\n    <img src=\"data:{};base64,{encoded}\" alt=\"{} diagram\">\n  </figure>\n",
        diagram.image.format.mime_type(),
        diagram.dialect.as_str(),
    ))
}
