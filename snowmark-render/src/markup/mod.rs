//! The markup tree: HTML elements, text and not-yet-parsed raw markup.
//!
//! Every stage after lowering works on this tree. It is deliberately small;
//! there is no document, doctype or comment node. Attribute order is the
//! insertion order, so serialization is deterministic.

pub mod parse;
pub mod serialize;

use indexmap::IndexMap;

pub use self::{parse::parse_fragment, serialize::serialize};

/// Elements that never have children or a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
  "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta",
  "source", "track", "wbr",
];

/// A node of the markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
  Element(Element),
  Text(String),
  /// Embedded markup copied from the source verbatim. Only ever present
  /// between lowering and sanitization.
  Raw(String),
}

impl MarkupNode {
  #[must_use]
  pub fn text(text: impl Into<String>) -> Self {
    Self::Text(text.into())
  }

  #[must_use]
  pub const fn as_element(&self) -> Option<&Element> {
    match self {
      Self::Element(element) => Some(element),
      _ => None,
    }
  }

  /// Concatenated descendant text.
  #[must_use]
  pub fn text_content(&self) -> String {
    let mut out = String::new();
    self.collect_text(&mut out);
    out
  }

  fn collect_text(&self, out: &mut String) {
    match self {
      Self::Text(text) | Self::Raw(text) => out.push_str(text),
      Self::Element(element) => {
        for child in &element.children {
          child.collect_text(out);
        }
      },
    }
  }
}

impl From<Element> for MarkupNode {
  fn from(element: Element) -> Self {
    Self::Element(element)
  }
}

/// An HTML element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
  pub name:     String,
  pub attrs:    IndexMap<String, String>,
  pub children: Vec<MarkupNode>,
}

impl Element {
  #[must_use]
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ..Self::default()
    }
  }

  /// Builder-style attribute setter.
  #[must_use]
  pub fn with_attr(
    mut self,
    name: impl Into<String>,
    value: impl Into<String>,
  ) -> Self {
    self.attrs.insert(name.into(), value.into());
    self
  }

  #[must_use]
  pub fn with_children(mut self, children: Vec<MarkupNode>) -> Self {
    self.children = children;
    self
  }

  #[must_use]
  pub fn with_text(self, text: impl Into<String>) -> Self {
    self.with_children(vec![MarkupNode::text(text)])
  }

  #[must_use]
  pub fn attr(&self, name: &str) -> Option<&str> {
    self.attrs.get(name).map(String::as_str)
  }

  #[must_use]
  pub fn is(&self, name: &str) -> bool {
    self.name.eq_ignore_ascii_case(name)
  }

  #[must_use]
  pub fn is_void(&self) -> bool {
    VOID_ELEMENTS.iter().any(|void| self.is(void))
  }

  /// Iterate the whitespace-separated entries of the `class` attribute.
  pub fn classes(&self) -> impl Iterator<Item = &str> {
    self.attr("class").unwrap_or_default().split_ascii_whitespace()
  }

  #[must_use]
  pub fn has_class(&self, class: &str) -> bool {
    self.classes().any(|c| c == class)
  }

  pub fn add_class(&mut self, class: &str) {
    if self.has_class(class) {
      return;
    }
    match self.attrs.get_mut("class") {
      Some(existing) if !existing.trim().is_empty() => {
        existing.push(' ');
        existing.push_str(class);
      },
      _ => {
        self.attrs.insert("class".to_string(), class.to_string());
      },
    }
  }

  /// Concatenated descendant text.
  #[must_use]
  pub fn text_content(&self) -> String {
    let mut out = String::new();
    for child in &self.children {
      child.collect_text(&mut out);
    }
    out
  }

  /// Heading level for `h1`..`h6`.
  #[must_use]
  pub fn heading_level(&self) -> Option<u8> {
    let mut chars = self.name.chars();
    match (chars.next(), chars.next(), chars.next()) {
      (Some('h' | 'H'), Some(digit @ '1'..='6'), None) => {
        digit.to_digit(10).and_then(|d| u8::try_from(d).ok())
      },
      _ => None,
    }
  }
}

/// A fragment of markup: the children of an implicit body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkupTree {
  pub children: Vec<MarkupNode>,
}

impl MarkupTree {
  #[must_use]
  pub const fn new(children: Vec<MarkupNode>) -> Self {
    Self { children }
  }

  /// Visit every element in document (pre-)order.
  pub fn for_each_element(&self, f: &mut impl FnMut(&Element)) {
    fn walk(nodes: &[MarkupNode], f: &mut impl FnMut(&Element)) {
      for node in nodes {
        if let MarkupNode::Element(element) = node {
          f(element);
          walk(&element.children, f);
        }
      }
    }
    walk(&self.children, f);
  }

  /// Visit every element in document (pre-)order, mutably.
  ///
  /// Children are visited after the callback returns, so a callback that
  /// replaces an element's children sees its new children next.
  pub fn for_each_element_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
    fn walk(nodes: &mut [MarkupNode], f: &mut impl FnMut(&mut Element)) {
      for node in nodes {
        if let MarkupNode::Element(element) = node {
          f(element);
          walk(&mut element.children, f);
        }
      }
    }
    walk(&mut self.children, f);
  }

  #[must_use]
  pub fn contains_raw(&self) -> bool {
    fn any_raw(nodes: &[MarkupNode]) -> bool {
      nodes.iter().any(|node| {
        match node {
          MarkupNode::Raw(_) => true,
          MarkupNode::Element(element) => any_raw(&element.children),
          MarkupNode::Text(_) => false,
        }
      })
    }
    any_raw(&self.children)
  }
}
