//! Math rendering to MathML.

use latex2mathml::{DisplayStyle, latex_to_mathml};
use log::warn;

use crate::{
  error::{RenderError, StageResult},
  markup::{Element, MarkupTree, parse_fragment},
};

/// Maximum nesting accepted when splicing rendered MathML into the tree.
const MATHML_MAX_DEPTH: usize = 256;

/// Longest math source handed to `latex2mathml`, in bytes.
pub const MAX_MATH_SOURCE_LEN: usize = 4096;

/// Deepest estimated nesting handed to `latex2mathml`. Its parser and
/// printer recurse once per level and cannot report running out of stack.
pub const MAX_MATH_NESTING: usize = 48;

/// Marker `latex2mathml` prints in place of nodes it could not parse.
const PARSE_ERROR_MARKER: &str = "[PARSE ERROR";

/// Converts TeX-style math notation to MathML.
pub trait MathRenderer: Send + Sync {
  /// Render `source` to a `<math>` element.
  ///
  /// # Errors
  ///
  /// Returns [`RenderError::Math`] when the notation is malformed.
  fn render(&self, source: &str, display: bool) -> StageResult<String>;
}

/// [`MathRenderer`] backed by `latex2mathml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LatexMathRenderer;

impl MathRenderer for LatexMathRenderer {
  fn render(&self, source: &str, display: bool) -> StageResult<String> {
    let style = if display {
      DisplayStyle::Block
    } else {
      DisplayStyle::Inline
    };
    check_math_limits(source)?;
    let mathml = latex_to_mathml(source, style)
      .map_err(|e| RenderError::Math(e.to_string()))?;
    if mathml.contains(PARSE_ERROR_MARKER) {
      return Err(RenderError::Math(format!("malformed math: {source}")));
    }
    Ok(mathml)
  }
}

/// Reject math too large or too deeply nested to convert safely.
///
/// # Errors
///
/// Returns [`RenderError::Math`] when `source` exceeds
/// [`MAX_MATH_SOURCE_LEN`] or [`MAX_MATH_NESTING`].
pub fn check_math_limits(source: &str) -> StageResult<()> {
  if source.len() > MAX_MATH_SOURCE_LEN {
    return Err(RenderError::Math(format!(
      "math source of {} bytes exceeds the limit of {MAX_MATH_SOURCE_LEN}",
      source.len()
    )));
  }
  let depth = estimate_nesting(source);
  if depth > MAX_MATH_NESTING {
    return Err(RenderError::Math(format!(
      "math nesting of {depth} exceeds the limit of {MAX_MATH_NESTING}"
    )));
  }
  Ok(())
}

/// Upper estimate of how deep `latex2mathml` will recurse on `source`.
///
/// Groups (`{`, `\left`, `\begin`) add a level until closed. Commands and
/// `^`/`_` may take the following token as an argument, so a run of them
/// without a plain token in between counts one level each.
fn estimate_nesting(source: &str) -> usize {
  let mut groups: usize = 0;
  let mut chain: usize = 0;
  let mut deepest: usize = 0;
  let mut chars = source.chars().peekable();

  while let Some(c) = chars.next() {
    match c {
      '\\' => {
        let mut name = String::new();
        while let Some(&next) = chars.peek() {
          if !next.is_ascii_alphabetic() {
            break;
          }
          name.push(next);
          chars.next();
        }
        if name.is_empty() {
          // Escaped symbol such as `\{`.
          chars.next();
          chain = 0;
        } else {
          match name.as_str() {
            "left" | "begin" => groups += 1,
            "right" | "end" => groups = groups.saturating_sub(1),
            _ => chain += 1,
          }
        }
      },
      '^' | '_' => chain += 1,
      '{' => {
        groups += 1;
        chain = 0;
      },
      '}' => groups = groups.saturating_sub(1),
      c if c.is_whitespace() => {},
      _ => chain = 0,
    }
    deepest = deepest.max(groups + chain);
  }
  deepest
}

/// Replace the source text of every math element with rendered MathML.
///
/// Math elements are those carrying the `math-inline` or `math-display`
/// class. On failure the element keeps its source text.
pub fn render_math(tree: &mut MarkupTree, renderer: &dyn MathRenderer) {
  tree.for_each_element_mut(&mut |element| {
    let display = element.has_class("math-display");
    if !display && !element.has_class("math-inline") {
      return;
    }
    if let Err(e) = render_element(element, renderer, display) {
      warn!("Leaving math as source text: {e}");
    }
  });
}

fn render_element(
  element: &mut Element,
  renderer: &dyn MathRenderer,
  display: bool,
) -> StageResult<()> {
  let source = element.text_content();
  let mathml = renderer.render(source.trim(), display)?;
  element.children = parse_fragment(&mathml, MATHML_MAX_DEPTH)?;
  Ok(())
}
