//! HTML text to markup nodes, through html5ever.
//!
//! Used when embedded markup is allowed: the lowered tree is serialized with
//! its raw fragments and parsed back, so that hand-written tags become real
//! elements the sanitizer can inspect. Also used to splice MathML and
//! highlighted code into the tree.

use kuchikikiki::{NodeData, NodeRef, parse_html};
use tendril::TendrilSink;

use super::{Element, MarkupNode};
use crate::error::{RenderError, StageResult};

/// Parse an HTML fragment as the content of a document body.
///
/// Comments, doctypes and processing instructions are dropped.
///
/// # Errors
///
/// Returns [`RenderError::NestingTooDeep`] when the markup nests deeper
/// than `max_depth` elements, and [`RenderError::Markup`] when the parser
/// produced no body to read from.
pub fn parse_fragment(
  html: &str,
  max_depth: usize,
) -> StageResult<Vec<MarkupNode>> {
  // html5ever slows down badly on deep trees; refuse them before parsing.
  if open_depth(html, max_depth) > max_depth {
    return Err(RenderError::NestingTooDeep { limit: max_depth });
  }

  let document =
    parse_html().one(format!("<!DOCTYPE html><html><body>{html}</body></html>"));

  let body = document
    .descendants()
    .find(|node| {
      node
        .as_element()
        .is_some_and(|element| &*element.name.local == "body")
    })
    .ok_or_else(|| RenderError::Markup("no body element".to_string()))?;

  convert_children(&body, max_depth, 0)
}

fn convert_children(
  parent: &NodeRef,
  max_depth: usize,
  depth: usize,
) -> StageResult<Vec<MarkupNode>> {
  if depth > max_depth {
    return Err(RenderError::NestingTooDeep { limit: max_depth });
  }

  let mut nodes: Vec<MarkupNode> = Vec::new();
  for child in parent.children() {
    match child.data() {
      NodeData::Element(data) => {
        let mut element = Element::new(data.name.local.to_string());
        for (name, attribute) in &data.attributes.borrow().map {
          element
            .attrs
            .insert(name.local.to_string(), attribute.value.clone());
        }
        element.children = convert_children(&child, max_depth, depth + 1)?;
        nodes.push(element.into());
      },
      NodeData::Text(text) => {
        let text = text.borrow();
        if let Some(MarkupNode::Text(previous)) = nodes.last_mut() {
          previous.push_str(&text);
        } else {
          nodes.push(MarkupNode::Text(text.clone()));
        }
      },
      _ => {},
    }
  }
  Ok(nodes)
}

/// Elements that never hold children.
const VOID_ELEMENTS: &[&str] = &[
  "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta",
  "param", "source", "track", "wbr",
];

/// Elements whose end tag may be left out; the parser closes them itself, so
/// they do not add depth when repeated.
const OPTIONAL_END_ELEMENTS: &[&str] = &[
  "p", "li", "dt", "dd", "tr", "td", "th", "option", "optgroup", "rp", "rt",
  "thead", "tbody", "tfoot", "colgroup", "caption",
];

/// Elements whose content is text up to their own end tag.
const RAW_TEXT_ELEMENTS: &[&str] =
  &["script", "style", "textarea", "title", "xmp", "noscript"];

/// Scan the raw tags of `html` and return the deepest element nesting seen,
/// stopping early once it passes `limit`.
fn open_depth(html: &str, limit: usize) -> usize {
  let lower = html.to_ascii_lowercase();
  let bytes = lower.as_bytes();
  let mut depth = 0_usize;
  let mut deepest = 0_usize;
  let mut pos = 0;

  while let Some(offset) = lower[pos..].find('<') {
    let start = pos + offset + 1;
    let Some(&next) = bytes.get(start) else { break };

    if lower[start..].starts_with("!--") {
      pos = lower[start..].find("-->").map_or(bytes.len(), |end| start + end + 3);
      continue;
    }
    if !(next.is_ascii_alphabetic() || matches!(next, b'/' | b'!' | b'?')) {
      pos = start;
      continue;
    }

    let Some(end) = lower[start..].find('>').map(|end| start + end) else {
      break;
    };
    pos = end + 1;

    if next == b'!' || next == b'?' {
      continue;
    }

    let tag = &lower[start..end];
    let name = tag
      .split(|c: char| c.is_ascii_whitespace() || c == '/')
      .find(|part| !part.is_empty())
      .unwrap_or_default();
    let counted =
      !(VOID_ELEMENTS.contains(&name) || OPTIONAL_END_ELEMENTS.contains(&name));

    if next == b'/' {
      if counted {
        depth = depth.saturating_sub(1);
      }
      continue;
    }

    if RAW_TEXT_ELEMENTS.contains(&name) {
      let closing = format!("</{name}");
      pos = lower[pos..]
        .find(&closing)
        .and_then(|at| lower[pos + at..].find('>').map(|gt| pos + at + gt + 1))
        .unwrap_or(bytes.len());
      continue;
    }
    if !counted || tag.ends_with('/') {
      continue;
    }

    depth += 1;
    deepest = deepest.max(depth);
    if deepest > limit {
      break;
    }
  }

  deepest
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;

  #[test]
  fn test_parse_elements_and_text() {
    let nodes = parse_fragment("<p class=\"x\">a <b>b</b></p>", 64).unwrap();
    assert_eq!(nodes.len(), 1);
    let p = nodes[0].as_element().unwrap();
    assert_eq!(p.name, "p");
    assert_eq!(p.attr("class"), Some("x"));
    assert_eq!(p.text_content(), "a b");
  }

  #[test]
  fn test_comments_are_dropped() {
    let nodes = parse_fragment("a<!-- secret -->b", 64).unwrap();
    assert_eq!(nodes, vec![MarkupNode::text("ab")]);
  }

  #[test]
  fn test_unclosed_tags_are_balanced() {
    let nodes = parse_fragment("<div><span>x", 64).unwrap();
    let div = nodes[0].as_element().unwrap();
    assert_eq!(div.children.len(), 1);
    assert_eq!(div.text_content(), "x");
  }

  #[test]
  fn test_foreign_content_keeps_names() {
    let nodes = parse_fragment(
      "<svg viewBox=\"0 0 16 16\"><path d=\"M0 0\"></path></svg>",
      64,
    )
    .unwrap();
    let svg = nodes[0].as_element().unwrap();
    assert_eq!(svg.name, "svg");
    assert_eq!(svg.attr("viewBox"), Some("0 0 16 16"));
    assert_eq!(svg.children[0].as_element().unwrap().name, "path");
  }

  #[test]
  fn test_depth_limit() {
    let html = "<div>".repeat(20);
    assert!(matches!(
      parse_fragment(&html, 8),
      Err(RenderError::NestingTooDeep { limit: 8 })
    ));
  }

  #[test]
  fn test_deep_fragment_is_refused_before_parsing() {
    let html = "<div>".repeat(20_000);
    let started = std::time::Instant::now();
    assert!(matches!(
      parse_fragment(&html, 64),
      Err(RenderError::NestingTooDeep { limit: 64 })
    ));
    assert!(started.elapsed() < std::time::Duration::from_secs(2));
  }

  #[test]
  fn test_open_depth() {
    assert_eq!(open_depth("<div><span>x</span></div>", 64), 2);
    assert_eq!(open_depth("<div></div><div></div>", 64), 1);
    assert_eq!(open_depth("a <br> b <img src=x> <hr/>", 64), 0);
    assert_eq!(open_depth(&"<p>".repeat(100), 64), 0);
    assert_eq!(open_depth("<!-- <div><div> --><b>x</b>", 64), 1);
    assert_eq!(open_depth("<script>if (a<b) { x = '<div>' }</script>", 64), 0);
    assert_eq!(open_depth("1 < 2 and <3", 64), 0);
    assert_eq!(open_depth(&"<div></p>".repeat(100), 64), 65);
    assert_eq!(open_depth(&"<div>".repeat(1000), 10), 11);
  }

  #[test]
  fn test_repeated_paragraph_tags_still_parse() {
    let html = "<p>a".repeat(100);
    let nodes = parse_fragment(&html, 8).unwrap();
    assert_eq!(nodes.len(), 100);
  }
}
