//! Core implementation of the markdown renderer.
//!
//! This module contains the rendering pipeline of `MarkdownRenderer`. The
//! stages run in a fixed order; each one is a plain function over the tree
//! produced by the one before it.
use std::sync::Arc;

use log::{trace, warn};

use super::{
  process::render_with_recovery,
  types::{MarkdownRenderer, RenderOptions},
};
use crate::{
  error::StageResult,
  extensions,
  headings::{assign_ids, extract_toc, retain_present},
  lower::{LowerOptions, lower},
  markup::serialize,
  parser,
  render::{LatexMathRenderer, MathRenderer, render_code, render_math},
  sanitize::{AllowListPolicy, sanitize},
  syntax::{SyntaxManager, create_default_manager},
  types::RenderResult,
};

impl MarkdownRenderer {
  /// Create a new `MarkdownRenderer` with the given options and the default
  /// allow-list policy.
  #[must_use]
  pub fn new(options: RenderOptions) -> Self {
    let syntax_manager = if options.highlight_code {
      match create_default_manager() {
        Ok(manager) => Some(Arc::new(manager)),
        Err(e) => {
          warn!("Syntax highlighting disabled: {e}");
          None
        },
      }
    } else {
      None
    };

    Self {
      options,
      policy: Arc::new(AllowListPolicy::default()),
      syntax_manager,
      math_renderer: Arc::new(LatexMathRenderer),
    }
  }

  /// Replace the allow-list policy. Names in the policy are lowercased.
  #[must_use]
  pub fn with_policy(mut self, policy: AllowListPolicy) -> Self {
    self.policy = Arc::new(policy.normalized());
    self
  }

  /// Replace the math renderer.
  #[must_use]
  pub fn with_math_renderer(mut self, renderer: Arc<dyn MathRenderer>) -> Self {
    self.math_renderer = renderer;
    self
  }

  /// Replace the syntax manager, or disable highlighting with `None`.
  #[must_use]
  pub fn with_syntax_manager(mut self, manager: Option<SyntaxManager>) -> Self {
    self.syntax_manager = manager.map(Arc::new);
    self
  }

  /// Access renderer options.
  #[must_use]
  pub const fn options(&self) -> &RenderOptions {
    &self.options
  }

  /// The allow-list policy applied to every render.
  #[must_use]
  pub fn policy(&self) -> &AllowListPolicy {
    &self.policy
  }

  /// The syntax manager, when highlighting is enabled.
  #[must_use]
  pub fn syntax_manager(&self) -> Option<&SyntaxManager> {
    self.syntax_manager.as_deref()
  }

  /// Render markdown to sanitized HTML and a table of contents.
  ///
  /// Never fails: if any stage fails, or panics, the result is the fallback
  /// paragraph with an empty table of contents.
  #[must_use]
  pub fn render(&self, markdown: &str) -> RenderResult {
    render_with_recovery(
      || self.try_render(markdown),
      &self.options.fallback_message,
    )
  }

  /// Run the pipeline, reporting the first stage failure.
  ///
  /// # Errors
  ///
  /// Returns the error of the first stage that failed.
  pub fn try_render(&self, markdown: &str) -> StageResult<RenderResult> {
    let options = &self.options;
    let extension_set = &options.extensions;

    let mut document =
      parser::parse(markdown, extension_set, options.max_nesting_depth)?;
    extensions::apply(
      &mut document,
      extension_set,
      &options.heading_id_prefix,
    );

    let mut tree = lower(&document, LowerOptions {
      allow_embedded_markup: options.allow_embedded_markup,
      max_nesting_depth:     options.max_nesting_depth,
    })?;
    trace!("Lowered document to {} top-level nodes", tree.children.len());

    if extension_set.math {
      render_math(&mut tree, self.math_renderer.as_ref());
    }
    if let Some(manager) = self.syntax_manager.as_deref() {
      render_code(&mut tree, manager);
    }

    assign_ids(&mut tree, &options.heading_id_prefix);
    let mut toc_items = extract_toc(&tree);

    sanitize(&mut tree, &self.policy);
    retain_present(&mut toc_items, &tree);

    let html_content = serialize(&tree)?;
    trace!(
      "Rendered {} bytes of HTML with {} headings",
      html_content.len(),
      toc_items.len()
    );

    Ok(RenderResult {
      html_content,
      toc_items,
    })
  }
}

impl Default for MarkdownRenderer {
  fn default() -> Self {
    Self::new(RenderOptions::default())
  }
}
