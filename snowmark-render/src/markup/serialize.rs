//! Markup tree to HTML text.

use std::fmt::Write;

use super::{Element, MarkupNode, MarkupTree};
use crate::error::StageResult;

/// Serialize a markup tree to HTML.
///
/// Text and attribute values are escaped. Raw nodes are written verbatim;
/// after sanitization the tree no longer contains any.
///
/// # Errors
///
/// Returns an error if writing to the output buffer fails.
pub fn serialize(tree: &MarkupTree) -> StageResult<String> {
  let mut out = String::new();
  write_nodes(&mut out, &tree.children)?;
  Ok(out)
}

fn write_nodes(out: &mut String, nodes: &[MarkupNode]) -> std::fmt::Result {
  for node in nodes {
    match node {
      MarkupNode::Element(element) => write_element(out, element)?,
      MarkupNode::Text(text) => out.push_str(&html_escape::encode_text(text)),
      MarkupNode::Raw(raw) => out.push_str(raw),
    }
  }
  Ok(())
}

fn write_element(out: &mut String, element: &Element) -> std::fmt::Result {
  write!(out, "<{}", element.name)?;
  for (name, value) in &element.attrs {
    write!(
      out,
      " {name}=\"{}\"",
      html_escape::encode_double_quoted_attribute(value)
    )?;
  }
  out.push('>');

  if element.is_void() {
    return Ok(());
  }

  write_nodes(out, &element.children)?;
  write!(out, "</{}>", element.name)
}
