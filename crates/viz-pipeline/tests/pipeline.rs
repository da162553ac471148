//! End-to-end pipeline runs against the in-memory engine.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use viz_config::Config;
use viz_engine::{EngineError, SessionManager, StaticEngine, StaticExtractor, TextExtractor};
use viz_pipeline::{PipelineController, PipelineError};
use viz_render::RenderFailure;

fn controller_with(engine: StaticEngine) -> PipelineController {
    // No settle delay in tests; the static engine has nothing to lay out.
    let config = Config::from_toml_str("[render]\nsettle_delay_ms = 0\n").unwrap();
    let session = SessionManager::with_session(Arc::new(engine));
    PipelineController::new(&config, session, Box::new(StaticExtractor::new())).unwrap()
}

const FENCED_DOC: &str = "\
# Payment Flow

The flow below is rendered as an image.

```mermaid
flowchart TD
  A[Request] --> B[Capture]
```

Closing remarks.
";

#[test]
fn test_single_fenced_block_end_to_end() {
    let controller = controller_with(StaticEngine::new());
    let processed = controller.process_text("flow.md", FENCED_DOC).unwrap();

    assert_eq!(processed.stats.blocks_found, 1);
    assert_eq!(processed.stats.blocks_rendered, 1);
    assert_eq!(processed.stats.page_count, 1);
    assert!(processed.stats.is_text_searchable);
    assert!(processed.failures.is_empty());

    let text = StaticExtractor::new()
        .extract_text(&processed.artifact.bytes)
        .unwrap();
    assert!(text.contains("Closing remarks."));
    assert!(!text.contains("```mermaid"));
    assert!(!text.contains("{{DIAGRAM_"));
}

#[test]
fn test_partial_failure_keeps_source_and_succeeds() {
    let doc = "\
# Mixed

```mermaid
flowchart TD
  A --> B
```

sequenceDiagram
  participant Alpha
  participant RENDER_BREAKER

Trailing prose.
";
    let engine = StaticEngine::new().timeout_when_contains("RENDER_BREAKER");
    let controller = controller_with(engine);
    let processed = controller.process_text("mixed.md", doc).unwrap();

    assert_eq!(processed.stats.blocks_found, 2);
    assert_eq!(processed.stats.blocks_rendered, 1);
    assert_eq!(processed.failures.len(), 1);
    assert!(matches!(
        processed.failures[0].reason,
        RenderFailure::Timeout { .. }
    ));

    // The failed block's source stays readable in the artifact.
    let text = StaticExtractor::new()
        .extract_text(&processed.artifact.bytes)
        .unwrap();
    assert!(text.contains("participant RENDER_BREAKER"));
    assert!(!text.contains("```mermaid"));
}

#[test]
fn test_document_without_diagrams_is_rejected() {
    let controller = controller_with(StaticEngine::new());
    let result = controller.process_text("notes.md", "# Notes\n\nOnly prose here.\n");
    assert!(matches!(result, Err(PipelineError::NoBlocksDetected)));
}

#[test]
fn test_unavailable_engine_fails_all_renders() {
    let controller = controller_with(StaticEngine::new().fail_page_creation());
    let result = controller.process_text("flow.md", FENCED_DOC);

    match result {
        Err(PipelineError::AllRendersFailed { failures }) => {
            assert_eq!(failures.len(), 1);
            assert!(matches!(
                failures[0].reason,
                RenderFailure::EngineUnavailable(_)
            ));
        }
        other => panic!("expected AllRendersFailed, got {other:?}"),
    }
}

#[test]
fn test_failed_session_launch_fails_all_renders() {
    let config = Config::from_toml_str("[render]\nsettle_delay_ms = 0\n").unwrap();
    let session =
        SessionManager::new(|| Err(EngineError::Unavailable("launch refused".to_owned())));
    let controller =
        PipelineController::new(&config, session, Box::new(StaticExtractor::new())).unwrap();

    let result = controller.process_text("flow.md", FENCED_DOC);
    assert!(matches!(
        result,
        Err(PipelineError::AllRendersFailed { .. })
    ));
}

#[test]
fn test_empty_document_is_a_parse_failure() {
    let controller = controller_with(StaticEngine::new());
    let result = controller.process_text("empty.md", "   \n");
    assert!(matches!(result, Err(PipelineError::Parse(_))));
}

#[test]
fn test_cleanup_is_idempotent() {
    let engine = StaticEngine::new();
    let controller = controller_with(engine.clone());
    controller.process_text("flow.md", FENCED_DOC).unwrap();

    controller.cleanup();
    controller.cleanup();
    assert_eq!(engine.shutdown_count(), 1);
}
