//! Type definitions for the markdown renderer.
//!
//! Contains the configuration options (`RenderOptions`), their builder and
//! the renderer struct itself (`MarkdownRenderer`).
//!
//! # Examples
//!
//! ```
//! use snowmark_render::{MarkdownRenderer, RenderOptions};
//!
//! let options = RenderOptions::builder()
//!   .emoji(false)
//!   .heading_id_prefix("doc-")
//!   .build();
//!
//! let renderer = MarkdownRenderer::new(options);
//! ```

use std::sync::Arc;

use crate::{
  extensions::ExtensionSet,
  render::MathRenderer,
  sanitize::AllowListPolicy,
  syntax::SyntaxManager,
};

/// Message rendered when the pipeline fails.
pub const DEFAULT_FALLBACK_MESSAGE: &str =
  "An error occurred while rendering this content.";

/// Default prefix of generated heading ids.
pub const DEFAULT_HEADING_ID_PREFIX: &str = "h-";

/// Default limit on document nesting.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 128;

/// Options for configuring the markdown renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
  /// Syntax extensions on top of CommonMark.
  pub extensions: ExtensionSet,

  /// Turn raw HTML in the source into real elements (which are then
  /// sanitized). When `false`, raw HTML is shown as escaped text.
  pub allow_embedded_markup: bool,

  /// Enable syntax highlighting for fenced code blocks.
  pub highlight_code: bool,

  /// Prefix of every generated heading id.
  pub heading_id_prefix: String,

  /// Message shown in place of the document when rendering fails.
  pub fallback_message: String,

  /// Documents nesting deeper than this fail to render.
  pub max_nesting_depth: usize,
}

impl Default for RenderOptions {
  fn default() -> Self {
    Self {
      extensions:            ExtensionSet::default(),
      allow_embedded_markup: true,
      highlight_code:        cfg!(feature = "syntect"),
      heading_id_prefix:     DEFAULT_HEADING_ID_PREFIX.to_string(),
      fallback_message:      DEFAULT_FALLBACK_MESSAGE.to_string(),
      max_nesting_depth:     DEFAULT_MAX_NESTING_DEPTH,
    }
  }
}

impl RenderOptions {
  #[must_use]
  pub fn builder() -> RenderOptionsBuilder {
    RenderOptionsBuilder::new()
  }
}

/// Markdown to sanitized HTML renderer.
///
/// Can be cheaply cloned and shared between threads; the policy, syntax
/// manager and math renderer sit behind `Arc` and are never mutated.
#[derive(Clone)]
pub struct MarkdownRenderer {
  pub(crate) options:        RenderOptions,
  pub(crate) policy:         Arc<AllowListPolicy>,
  pub(crate) syntax_manager: Option<Arc<SyntaxManager>>,
  pub(crate) math_renderer:  Arc<dyn MathRenderer>,
}

impl std::fmt::Debug for MarkdownRenderer {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("MarkdownRenderer")
      .field("options", &self.options)
      .field("policy", &self.policy)
      .field("syntax_manager", &self.syntax_manager)
      .finish_non_exhaustive()
  }
}

/// Builder for constructing `RenderOptions` with method chaining.
#[derive(Debug, Clone, Default)]
pub struct RenderOptionsBuilder {
  options: RenderOptions,
}

impl RenderOptionsBuilder {
  /// Create a new builder with default options.
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Enable or disable GFM tables, autolinks and strikethrough.
  #[must_use]
  pub const fn gfm(mut self, enabled: bool) -> Self {
    self.options.extensions.gfm = enabled;
    self
  }

  /// Enable or disable single-newline hard breaks.
  #[must_use]
  pub const fn hard_breaks(mut self, enabled: bool) -> Self {
    self.options.extensions.hard_breaks = enabled;
    self
  }

  /// Enable or disable `$math$`.
  #[must_use]
  pub const fn math(mut self, enabled: bool) -> Self {
    self.options.extensions.math = enabled;
    self
  }

  /// Enable or disable `:emoji:` shortcodes.
  #[must_use]
  pub const fn emoji(mut self, enabled: bool) -> Self {
    self.options.extensions.emoji = enabled;
    self
  }

  /// Enable or disable `> [!NOTE]` alerts.
  #[must_use]
  pub const fn alerts(mut self, enabled: bool) -> Self {
    self.options.extensions.alerts = enabled;
    self
  }

  /// Enable or disable the generated list under a "Contents" heading.
  #[must_use]
  pub const fn toc(mut self, enabled: bool) -> Self {
    self.options.extensions.toc = enabled;
    self
  }

  #[must_use]
  pub const fn allow_embedded_markup(mut self, enabled: bool) -> Self {
    self.options.allow_embedded_markup = enabled;
    self
  }

  /// Enable or disable syntax highlighting.
  #[must_use]
  pub const fn highlight_code(mut self, enabled: bool) -> Self {
    self.options.highlight_code = enabled;
    self
  }

  #[must_use]
  pub fn heading_id_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
    self.options.heading_id_prefix = prefix.into();
    self
  }

  #[must_use]
  pub fn fallback_message<S: Into<String>>(mut self, message: S) -> Self {
    self.options.fallback_message = message.into();
    self
  }

  #[must_use]
  pub const fn max_nesting_depth(mut self, depth: usize) -> Self {
    self.options.max_nesting_depth = depth;
    self
  }

  /// Build the final `RenderOptions`.
  #[must_use]
  pub fn build(self) -> RenderOptions {
    self.options
  }
}
