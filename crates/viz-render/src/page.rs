//! HTML pages loaded into the engine to materialize a single diagram.

/// Page that renders Mermaid source client-side. The engine waits for
/// `.mermaid svg` to appear before capturing `.mermaid`.
pub const MERMAID_WAIT_SELECTOR: &str = ".mermaid svg";
pub const MERMAID_CAPTURE_SELECTOR: &str = ".mermaid";

/// Page that loads a pre-rendered PlantUML image from the remote server.
pub const PLANTUML_WAIT_SELECTOR: &str = "img";
pub const PLANTUML_CAPTURE_SELECTOR: &str = "img";

#[must_use]
pub fn mermaid_page(source: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <script src="https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.min.js"></script>
  <style>
    body {{ background: white; margin: 0; padding: 16px; }}
    .mermaid {{ display: inline-block; }}
  </style>
</head>
<body>
  <div class="mermaid">
{source}
  </div>
  <script>
    mermaid.initialize({{ startOnLoad: true, theme: 'default' }});
  </script>
</body>
</html>
"#
    )
}

#[must_use]
pub fn plantuml_page(image_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <style>
    body {{ background: white; margin: 0; padding: 0; }}
    img {{ display: block; }}
  </style>
</head>
<body>
  <img src="{image_url}">
</body>
</html>
"#
    )
}
