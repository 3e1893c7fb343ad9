//! Allow-list sanitization of the markup tree.
//!
//! This is the only XSS boundary of the pipeline. It runs after every stage
//! that produces markup, so whatever it lets through is what gets serialized.

pub mod policy;

use std::collections::BTreeSet;

use log::debug;
use url::{ParseError, Url};

pub use self::policy::{ANY_TAG, AllowListPolicy};
use crate::markup::{Element, MarkupNode, MarkupTree};

/// Filter the tree against `policy`.
///
/// - elements not in the allow-list are replaced by their (sanitized)
///   children, or removed outright when listed in `strip`
/// - attributes not allowed for the tag or globally are removed
/// - URL attributes with a scheme outside the allowed protocols are removed
/// - required attributes are forced
/// - raw markup is turned into text
pub fn sanitize(tree: &mut MarkupTree, policy: &AllowListPolicy) {
  let nodes = std::mem::take(&mut tree.children);
  tree.children = sanitize_nodes(nodes, policy);
}

fn sanitize_nodes(
  nodes: Vec<MarkupNode>,
  policy: &AllowListPolicy,
) -> Vec<MarkupNode> {
  let mut out = Vec::with_capacity(nodes.len());
  sanitize_into(nodes, policy, &mut out);
  out
}

fn sanitize_into(
  nodes: Vec<MarkupNode>,
  policy: &AllowListPolicy,
  out: &mut Vec<MarkupNode>,
) {
  for node in nodes {
    match node {
      MarkupNode::Text(text) | MarkupNode::Raw(text) => push_text(out, text),
      MarkupNode::Element(mut element) => {
        let tag = element.name.to_ascii_lowercase();
        if policy.strips(&tag) {
          debug!("Removed <{tag}> element and its content");
          continue;
        }

        let children = std::mem::take(&mut element.children);
        if !policy.allows_tag(&tag) {
          debug!("Unwrapped disallowed <{tag}> element");
          sanitize_into(children, policy, out);
          continue;
        }

        element.children = sanitize_nodes(children, policy);
        sanitize_attributes(&mut element, &tag, policy);
        out.push(element.into());
      },
    }
  }
}

/// Append text, merging with a preceding text node.
fn push_text(out: &mut Vec<MarkupNode>, text: String) {
  if let Some(MarkupNode::Text(previous)) = out.last_mut() {
    previous.push_str(&text);
  } else {
    out.push(MarkupNode::Text(text));
  }
}

fn sanitize_attributes(element: &mut Element, tag: &str, policy: &AllowListPolicy) {
  element.attrs.retain(|name, value| {
    let name = name.to_ascii_lowercase();
    if !policy.allows_attribute(tag, &name) {
      debug!("Removed attribute {name} from <{tag}>");
      return false;
    }
    if let Some(protocols) = policy.protocols_for(&name) {
      if !url_is_allowed(value, protocols) {
        debug!("Removed {name} with disallowed protocol from <{tag}>");
        return false;
      }
    }
    true
  });

  if let Some(required) = policy.required_for(tag) {
    for (name, value) in required {
      element.attrs.insert(name.clone(), value.clone());
    }
  }
}

/// Whether a URL is relative or uses one of the allowed schemes.
///
/// Whitespace and control characters are dropped before parsing, since
/// browsers skip them while reading a scheme (`java\nscript:`). Anything the
/// URL parser reads as relative is allowed; absolute URLs must use a listed
/// scheme and URLs that fail to parse otherwise are rejected.
#[must_use]
pub fn url_is_allowed(url: &str, protocols: &BTreeSet<String>) -> bool {
  let cleaned: String = url
    .chars()
    .filter(|c| !c.is_whitespace() && !c.is_control())
    .collect();

  match Url::parse(&cleaned) {
    Ok(parsed) => protocols.contains(parsed.scheme()),
    Err(ParseError::RelativeUrlWithoutBase) => true,
    Err(e) => {
      debug!("Rejected unparsable URL {cleaned:?}: {e}");
      false
    },
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;
  use crate::markup::serialize;

  fn clean(nodes: Vec<MarkupNode>) -> String {
    let mut tree = MarkupTree::new(nodes);
    sanitize(&mut tree, &AllowListPolicy::default());
    serialize(&tree).unwrap()
  }

  fn web() -> BTreeSet<String> {
    ["http", "https", "mailto"]
      .into_iter()
      .map(str::to_string)
      .collect()
  }

  #[test]
  fn test_url_schemes() {
    let protocols = web();
    assert!(url_is_allowed("https://example.com", &protocols));
    assert!(url_is_allowed("HTTPS://example.com", &protocols));
    assert!(url_is_allowed("mailto:a@b.c", &protocols));
    assert!(url_is_allowed("/relative/path", &protocols));
    assert!(url_is_allowed("#anchor", &protocols));
    assert!(url_is_allowed("page?x=a:b", &protocols));
    assert!(url_is_allowed("./a:b", &protocols));
    assert!(!url_is_allowed("javascript:alert(1)", &protocols));
    assert!(!url_is_allowed(" java\nscript:alert(1)", &protocols));
    assert!(!url_is_allowed("java\u{0}script:alert(1)", &protocols));
    assert!(!url_is_allowed("vbscript:x", &protocols));
    assert!(!url_is_allowed("data:text/html,<script>", &protocols));
    assert!(!url_is_allowed("https://[::1", &protocols));
    // No scheme before the colon, so this is a relative path.
    assert!(url_is_allowed(":nothing", &protocols));
  }

  #[test]
  fn test_strips_script_with_content() {
    let html = clean(vec![
      Element::new("p").with_text("a").into(),
      Element::new("script").with_text("alert(1)").into(),
    ]);
    assert_eq!(html, "<p>a</p>");
  }

  #[test]
  fn test_unwraps_unknown_elements() {
    let html = clean(vec![
      Element::new("form")
        .with_children(vec![
          Element::new("button").with_text("Go").into(),
          MarkupNode::text(" now"),
        ])
        .into(),
    ]);
    assert_eq!(html, "Go now");
  }

  #[test]
  fn test_removes_event_handlers() {
    let html = clean(vec![
      Element::new("img")
        .with_attr("src", "x.png")
        .with_attr("onerror", "alert(1)")
        .with_attr("alt", "x")
        .into(),
    ]);
    assert_eq!(html, "<img src=\"x.png\" alt=\"x\">");
  }

  #[test]
  fn test_removes_javascript_links() {
    let html = clean(vec![
      Element::new("a")
        .with_attr("href", "javascript:alert(1)")
        .with_text("click")
        .into(),
    ]);
    assert_eq!(html, "<a>click</a>");
  }

  #[test]
  fn test_keeps_data_and_aria_attributes() {
    let html = clean(vec![
      Element::new("span")
        .with_attr("data-line", "3")
        .with_attr("aria-label", "x")
        .with_attr("onclick", "y")
        .into(),
    ]);
    assert_eq!(html, "<span data-line=\"3\" aria-label=\"x\"></span>");
  }

  #[test]
  fn test_required_attributes() {
    let html = clean(vec![
      Element::new("input")
        .with_attr("type", "text")
        .with_attr("checked", "")
        .into(),
    ]);
    assert_eq!(
      html,
      "<input type=\"checkbox\" checked=\"\" disabled=\"\">"
    );
  }

  #[test]
  fn test_case_insensitive_names() {
    let html = clean(vec![
      Element::new("SCRIPT").with_text("x").into(),
      Element::new("svg")
        .with_attr("viewBox", "0 0 1 1")
        .with_attr("onLoad", "x")
        .into(),
    ]);
    assert_eq!(html, "<svg viewBox=\"0 0 1 1\"></svg>");
  }

  #[test]
  fn test_raw_becomes_text() {
    let html = clean(vec![MarkupNode::Raw("<b>x</b>".to_string())]);
    assert_eq!(html, "&lt;b&gt;x&lt;/b&gt;");
  }
}
