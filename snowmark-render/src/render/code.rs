//! Syntax highlighting of fenced code blocks.

use log::{debug, warn};

use crate::{
  error::StageResult,
  markup::{Element, MarkupNode, MarkupTree, parse_fragment},
  syntax::SyntaxManager,
};

/// Maximum nesting accepted when splicing highlighted tokens into the tree.
const TOKENS_MAX_DEPTH: usize = 64;

/// Highlight every `pre > code.language-*` block.
///
/// A highlighted block's `code` element receives class-annotated token spans
/// and its `pre` gains the `highlight` class. Blocks in an unknown language
/// are left alone.
pub fn render_code(tree: &mut MarkupTree, manager: &SyntaxManager) {
  tree.for_each_element_mut(&mut |element| {
    if !element.is("pre") {
      return;
    }
    match highlight_pre(element, manager) {
      Ok(true) => element.add_class("highlight"),
      Ok(false) => {},
      Err(e) => warn!("Leaving code block unhighlighted: {e}"),
    }
  });
}

fn highlight_pre(pre: &mut Element, manager: &SyntaxManager) -> StageResult<bool> {
  let Some(code) = pre.children.iter_mut().find_map(|child| {
    match child {
      MarkupNode::Element(element) if element.is("code") => Some(element),
      _ => None,
    }
  }) else {
    return Ok(false);
  };

  let Some(language) = language_of(code) else {
    return Ok(false);
  };
  if !manager.supports(&language) {
    debug!("No syntax definition for '{language}'");
    return Ok(false);
  }

  let highlighted = manager.highlight_code(&code.text_content(), &language)?;
  code.children = parse_fragment(&highlighted, TOKENS_MAX_DEPTH)?;
  Ok(true)
}

fn language_of(code: &Element) -> Option<String> {
  code
    .classes()
    .find_map(|class| class.strip_prefix("language-"))
    .filter(|language| !language.is_empty())
    .map(str::to_string)
}
