//! Error types for the rendering pipeline.

/// Result type for pipeline stages.
pub type StageResult<T> = Result<T, RenderError>;

/// Errors raised by a pipeline stage.
///
/// None of these reach the caller of [`crate::MarkdownRenderer::render`]; the
/// orchestrator turns them into the fallback result. They are exposed so that
/// [`crate::MarkdownRenderer::try_render`] callers can inspect them.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
  #[error("Document nesting exceeds the limit of {limit} levels")]
  NestingTooDeep { limit: usize },

  #[error("Failed to re-parse embedded markup: {0}")]
  Markup(String),

  #[error("Failed to serialize markup: {0}")]
  Serialize(#[from] std::fmt::Error),

  #[error("Math rendering failed: {0}")]
  Math(String),

  #[error("Syntax highlighting failed: {0}")]
  Syntax(#[from] crate::syntax::SyntaxError),

  #[error("Rendering stage panicked: {0}")]
  Panic(String),
}
