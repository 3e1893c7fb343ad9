//! The rendering pipeline.
//!
//! # Architecture
//!
//! - [`types`]: options, their builder and the renderer struct
//! - [`core`]: the pipeline itself, stage by stage
//! - [`process`]: error recovery and the service response envelope
//!
//! A render runs these stages in order: parse, syntax extensions, lowering to
//! markup, math, code highlighting, heading ids, table of contents,
//! sanitization and serialization. Any failure, including a panic, yields
//! the fallback result instead.
pub mod core;
pub mod process;
pub mod types;

pub use process::{render_response, render_with_recovery};
pub use types::{
  DEFAULT_FALLBACK_MESSAGE,
  DEFAULT_HEADING_ID_PREFIX,
  DEFAULT_MAX_NESTING_DEPTH,
  MarkdownRenderer,
  RenderOptions,
  RenderOptionsBuilder,
};

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::panic, reason = "Fine in tests")]

  use std::sync::Arc;

  use super::*;
  use crate::{
    error::{RenderError, StageResult},
    render::MathRenderer,
    sanitize::AllowListPolicy,
    types::TocEntry,
  };

  fn plain_renderer() -> MarkdownRenderer {
    MarkdownRenderer::new(RenderOptions::builder().highlight_code(false).build())
  }

  struct PanickingMath;

  impl MathRenderer for PanickingMath {
    fn render(&self, _source: &str, _display: bool) -> StageResult<String> {
      panic!("math backend crashed");
    }
  }

  #[test]
  fn test_heading_gets_id() {
    let result = plain_renderer().render("# Hello");
    assert_eq!(result.html_content, "<h1 id=\"h-hello\">Hello</h1>");
    assert_eq!(result.toc_items, vec![TocEntry {
      level: 1,
      text:  "Hello".to_string(),
      id:    "h-hello".to_string(),
    }]);
  }

  #[test]
  fn test_custom_prefix() {
    let renderer = MarkdownRenderer::new(
      RenderOptions::builder()
        .highlight_code(false)
        .heading_id_prefix("doc-")
        .build(),
    );
    let result = renderer.render("## Setup");
    assert_eq!(result.toc_items[0].id, "doc-setup");
  }

  #[test]
  fn test_script_is_removed_but_heading_kept() {
    let result =
      plain_renderer().render("<script>alert(1)</script>\n\n# Title");
    assert!(!result.html_content.contains("script"));
    assert!(!result.html_content.contains("alert"));
    assert_eq!(result.toc_items.len(), 1);
    assert_eq!(result.toc_items[0].id, "h-title");
  }

  #[test]
  fn test_toc_drops_headings_removed_by_policy() {
    let mut policy = AllowListPolicy::default();
    policy.strip.insert("h2".to_string());
    let renderer = plain_renderer().with_policy(policy);
    let result = renderer.render("# Kept\n\n## Gone");
    assert_eq!(result.toc_items.len(), 1);
    assert_eq!(result.toc_items[0].text, "Kept");
    assert!(!result.html_content.contains("Gone"));
  }

  #[test]
  fn test_try_render_reports_nesting() {
    let renderer = MarkdownRenderer::new(
      RenderOptions::builder()
        .highlight_code(false)
        .max_nesting_depth(8)
        .build(),
    );
    let error = renderer.try_render(&">".repeat(32)).unwrap_err();
    assert!(matches!(error, RenderError::NestingTooDeep { limit: 8 }));
  }

  #[test]
  fn test_deep_nesting_falls_back() {
    let renderer = MarkdownRenderer::new(
      RenderOptions::builder()
        .highlight_code(false)
        .max_nesting_depth(8)
        .fallback_message("Too deep")
        .build(),
    );
    let result = renderer.render(&">".repeat(32));
    assert_eq!(result.html_content, "<p>Too deep</p>");
    assert!(result.toc_items.is_empty());
  }

  #[test]
  fn test_panicking_stage_falls_back() {
    let renderer =
      plain_renderer().with_math_renderer(Arc::new(PanickingMath));
    let result = renderer.render("# Title\n\n$x$");
    assert_eq!(result.html_content, format!("<p>{DEFAULT_FALLBACK_MESSAGE}</p>"));
    assert!(result.toc_items.is_empty());
  }

  #[test]
  fn test_math_disabled_skips_renderer() {
    let renderer = MarkdownRenderer::new(
      RenderOptions::builder()
        .highlight_code(false)
        .math(false)
        .build(),
    )
    .with_math_renderer(Arc::new(PanickingMath));
    let result = renderer.render("costs $5");
    assert_eq!(result.html_content, "<p>costs $5</p>");
  }

  #[test]
  fn test_renderer_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<MarkdownRenderer>();
  }
}
