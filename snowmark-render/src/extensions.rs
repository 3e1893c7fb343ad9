//! Syntax extensions applied on top of the base CommonMark grammar.
//!
//! The extension list is fixed and ordered by [`SyntaxExtension::ORDER`].
//! Extensions that need grammar support are switched on in the comrak options
//! before parsing; the rest rewrite the parsed tree afterwards, in order.
//! Everything they produce is lowered and sanitized like authored content.

use std::sync::LazyLock;

use log::trace;
use regex::Regex;

use crate::{
  ast::{AlertKind, Node},
  headings::Slugger,
};

/// One syntax extension of the markdown dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxExtension {
  /// CommonMark base grammar, always on.
  Base,
  /// GFM tables, autolinks and strikethrough.
  Gfm,
  /// Every single newline inside a paragraph becomes a hard line break.
  LineBreaks,
  /// `$inline$` and `$$display$$` math.
  Math,
  /// `:shortcode:` emoji.
  Emoji,
  /// GitHub alert blockquotes such as `> [!NOTE]`.
  Alerts,
  /// A list of links to the following headings, generated under a heading
  /// named "Contents", "Table of contents" or "TOC".
  Toc,
}

impl SyntaxExtension {
  /// Application order. Later extensions see the output of earlier ones.
  pub const ORDER: [Self; 7] = [
    Self::Base,
    Self::Gfm,
    Self::LineBreaks,
    Self::Math,
    Self::Emoji,
    Self::Alerts,
    Self::Toc,
  ];

  /// Enable the grammar support this extension needs, if any.
  pub fn configure(self, options: &mut comrak::options::Options) {
    match self {
      Self::Gfm => {
        options.extension.table = true;
        options.extension.autolink = true;
        options.extension.strikethrough = true;
      },
      Self::Math => options.extension.math_dollars = true,
      Self::Base
      | Self::LineBreaks
      | Self::Emoji
      | Self::Alerts
      | Self::Toc => {},
    }
  }

  /// Stateless tree rewrite performed by this extension after parsing, if
  /// any. [`SyntaxExtension::Toc`] needs the heading id prefix and is run
  /// by [`apply`] through [`TocTransformer`].
  #[must_use]
  pub fn transformer(self) -> Option<&'static dyn AstTransformer> {
    match self {
      Self::LineBreaks => Some(&LineBreakTransformer),
      Self::Emoji => Some(&EmojiTransformer),
      Self::Alerts => Some(&AlertTransformer),
      Self::Base | Self::Gfm | Self::Math | Self::Toc => None,
    }
  }
}

/// Which extensions are switched on. The base grammar cannot be disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools, reason = "One toggle per extension")]
pub struct ExtensionSet {
  pub gfm:         bool,
  pub hard_breaks: bool,
  pub math:        bool,
  pub emoji:       bool,
  pub alerts:      bool,
  pub toc:         bool,
}

impl Default for ExtensionSet {
  fn default() -> Self {
    Self {
      gfm:         true,
      hard_breaks: true,
      math:        true,
      emoji:       true,
      alerts:      true,
      toc:         true,
    }
  }
}

impl ExtensionSet {
  #[must_use]
  pub const fn is_enabled(&self, extension: SyntaxExtension) -> bool {
    match extension {
      SyntaxExtension::Base => true,
      SyntaxExtension::Gfm => self.gfm,
      SyntaxExtension::LineBreaks => self.hard_breaks,
      SyntaxExtension::Math => self.math,
      SyntaxExtension::Emoji => self.emoji,
      SyntaxExtension::Alerts => self.alerts,
      SyntaxExtension::Toc => self.toc,
    }
  }
}

/// Run the tree rewrites of all enabled extensions, in order.
///
/// `heading_id_prefix` must be the prefix later given to
/// [`crate::headings::assign_ids`], so that generated contents links point
/// at the ids the headings end up with.
pub fn apply(
  document: &mut Node,
  extensions: &ExtensionSet,
  heading_id_prefix: &str,
) {
  for extension in SyntaxExtension::ORDER {
    if !extensions.is_enabled(extension) {
      continue;
    }
    if extension == SyntaxExtension::Toc {
      trace!("Applying syntax extension {extension:?}");
      TocTransformer { heading_id_prefix }.transform(document);
    } else if let Some(transformer) = extension.transformer() {
      trace!("Applying syntax extension {extension:?}");
      transformer.transform(document);
    }
  }
}

/// Trait for in-place rewrites of the document tree.
pub trait AstTransformer: Sync {
  fn transform(&self, node: &mut Node);
}

/// Turns soft breaks into hard breaks.
pub struct LineBreakTransformer;

impl AstTransformer for LineBreakTransformer {
  fn transform(&self, node: &mut Node) {
    if matches!(node, Node::SoftBreak) {
      *node = Node::LineBreak;
      return;
    }
    for child in node.children_mut().into_iter().flatten() {
      self.transform(child);
    }
  }
}

/// Replaces `:shortcode:` in text with the emoji it names.
///
/// Only plain text leaves are touched, so code, math and raw HTML keep their
/// colons. Unknown shortcodes stay as written.
pub struct EmojiTransformer;

impl AstTransformer for EmojiTransformer {
  fn transform(&self, node: &mut Node) {
    static SHORTCODE_RE: LazyLock<Regex> = LazyLock::new(|| {
      Regex::new(r":([a-z0-9_+\-]+):").unwrap_or_else(|e| {
        log::error!(
          "Failed to compile SHORTCODE_RE regex: {e}\n Falling back to never \
           matching regex."
        );
        crate::utils::never_matching_regex()
      })
    });

    if let Node::Text(text) = node {
      if text.contains(':') {
        let replaced = SHORTCODE_RE
          .replace_all(text, |caps: &regex::Captures| {
            emojis::get_by_shortcode(&caps[1]).map_or_else(
              || caps[0].to_string(),
              |emoji| emoji.as_str().to_string(),
            )
          })
          .into_owned();
        *text = replaced;
      }
      return;
    }
    for child in node.children_mut().into_iter().flatten() {
      self.transform(child);
    }
  }
}

/// Turns `> [!KIND]` blockquotes into admonitions.
pub struct AlertTransformer;

impl AstTransformer for AlertTransformer {
  fn transform(&self, node: &mut Node) {
    for child in node.children_mut().into_iter().flatten() {
      self.transform(child);
    }

    if let Node::BlockQuote(children) = node {
      if let Some(kind) = take_alert_marker(children) {
        *node = Node::Admonition {
          kind,
          children: std::mem::take(children),
        };
      }
    }
  }
}

/// Strip a leading `[!KIND]` marker from a blockquote body.
///
/// The marker must open the first paragraph and be followed by whitespace, a
/// line break or the end of the paragraph. The break after the marker is
/// removed too, and the paragraph is dropped if nothing is left of it.
fn take_alert_marker(children: &mut Vec<Node>) -> Option<AlertKind> {
  static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[!([A-Za-z]+)\](?:[ \t]+|$)").unwrap_or_else(|e| {
      log::error!(
        "Failed to compile MARKER_RE regex: {e}\n Falling back to never \
         matching regex."
      );
      crate::utils::never_matching_regex()
    })
  });

  let Some(Node::Paragraph(inlines)) = children.first_mut() else {
    return None;
  };
  let Some(Node::Text(first)) = inlines.first_mut() else {
    return None;
  };

  let (kind, marker_len) = {
    let captures = MARKER_RE.captures(first)?;
    (AlertKind::from_keyword(&captures[1])?, captures[0].len())
  };
  first.replace_range(..marker_len, "");

  if first.is_empty() {
    inlines.remove(0);
    if matches!(inlines.first(), Some(Node::SoftBreak | Node::LineBreak)) {
      inlines.remove(0);
    }
  }
  if inlines.is_empty() {
    children.remove(0);
  }

  Some(kind)
}

/// Fills the section under the first top-level "Contents" heading with a
/// nested list linking to the top-level headings that follow the section.
///
/// The section runs up to the next heading of the same or a higher rank and
/// its previous content is replaced. Without such a closing heading, or with
/// no headings after it, the document is left alone. Links point at
/// `heading_id_prefix` + the slug the heading will be given.
pub struct TocTransformer<'a> {
  pub heading_id_prefix: &'a str,
}

impl AstTransformer for TocTransformer<'_> {
  fn transform(&self, node: &mut Node) {
    let Node::Document(blocks) = node else {
      return;
    };

    let Some((open, open_level)) =
      blocks.iter().enumerate().find_map(|(index, block)| {
        match block {
          Node::Heading { level, .. } if is_contents_heading(block) => {
            Some((index, *level))
          },
          _ => None,
        }
      })
    else {
      return;
    };
    let Some(close) = blocks
      .iter()
      .skip(open + 1)
      .position(|block| {
        matches!(block, Node::Heading { level, .. } if *level <= open_level)
      })
      .map(|offset| open + 1 + offset)
    else {
      return;
    };

    let anchors = heading_anchors(blocks);
    let entries: Vec<(u8, Node)> = blocks
      .iter()
      .enumerate()
      .skip(close)
      .filter_map(|(index, block)| {
        let Node::Heading { level, children } = block else {
          return None;
        };
        if block.plain_text().trim().is_empty() {
          return None;
        }
        let slug = anchors.get(index)?.as_deref()?;
        let link = Node::Link {
          url:      format!("#{}{slug}", self.heading_id_prefix),
          title:    String::new(),
          children: without_links(children),
        };
        Some((*level, link))
      })
      .collect();

    let Some(min_level) = entries.iter().map(|(level, _)| *level).min() else {
      return;
    };
    let mut items = Vec::new();
    for (level, link) in entries {
      insert_entry(&mut items, level - min_level + 1, link);
    }

    trace!("Generated contents list under heading {open}");
    blocks.drain(open + 1..close);
    blocks.insert(open + 1, contents_list(items));
  }
}

/// Whether a heading reads "Contents", "Table of contents" or "TOC".
fn is_contents_heading(heading: &Node) -> bool {
  static CONTENTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:(?:table[ -]of[ -])?contents?|toc)$").unwrap_or_else(
      |e| {
        log::error!(
          "Failed to compile CONTENTS_RE regex: {e}\n Falling back to never \
           matching regex."
        );
        crate::utils::never_matching_regex()
      },
    )
  });

  CONTENTS_RE.is_match(heading.plain_text().trim())
}

/// The slug each top-level heading will get, indexed like `blocks`.
///
/// Every heading in the document takes part, in document order, so that
/// duplicates are numbered exactly as heading id assignment numbers them.
fn heading_anchors(blocks: &[Node]) -> Vec<Option<String>> {
  fn walk(node: &Node, slugger: &mut Slugger) -> Option<String> {
    if matches!(node, Node::Heading { .. }) {
      return Some(slugger.slug(node.plain_text().trim()));
    }
    for child in node.children().unwrap_or_default() {
      walk(child, slugger);
    }
    None
  }

  let mut slugger = Slugger::new();
  blocks.iter().map(|block| walk(block, &mut slugger)).collect()
}

/// Heading content for use as link text: nested links are unwrapped.
fn without_links(children: &[Node]) -> Vec<Node> {
  let mut out = Vec::with_capacity(children.len());
  for child in children {
    match child {
      Node::Link { children, .. } => out.extend(without_links(children)),
      other => {
        let mut other = other.clone();
        if let Some(nested) = other.children_mut() {
          *nested = without_links(nested);
        }
        out.push(other);
      },
    }
  }
  out
}

const fn contents_list(items: Vec<Node>) -> Node {
  Node::List {
    ordered: false,
    start:   0,
    tight:   true,
    items,
  }
}

/// Add a link at `depth` (1 = top) below the last item of `items`, creating
/// intermediate items and lists where a level was skipped.
fn insert_entry(items: &mut Vec<Node>, depth: u8, link: Node) {
  if depth <= 1 {
    items.push(Node::ListItem(vec![Node::Paragraph(vec![link])]));
    return;
  }
  if !matches!(items.last(), Some(Node::ListItem(_))) {
    items.push(Node::ListItem(Vec::new()));
  }
  let Some(Node::ListItem(children)) = items.last_mut() else {
    return;
  };
  if !matches!(children.last(), Some(Node::List { .. })) {
    children.push(contents_list(Vec::new()));
  }
  if let Some(Node::List { items, .. }) = children.last_mut() {
    insert_entry(items, depth - 1, link);
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::panic, reason = "Fine in tests")]

  use super::*;
  use crate::parser::parse;

  fn parse_with(markdown: &str, extensions: &ExtensionSet) -> Node {
    let mut doc = parse(markdown, extensions, 128).unwrap();
    apply(&mut doc, extensions, "h-");
    doc
  }

  fn first_block(doc: &Node) -> &Node {
    &doc.children().unwrap()[0]
  }

  #[test]
  fn test_order_is_fixed() {
    assert_eq!(SyntaxExtension::ORDER[0], SyntaxExtension::Base);
    assert_eq!(SyntaxExtension::ORDER[5], SyntaxExtension::Alerts);
    let position = |ext| {
      SyntaxExtension::ORDER
        .iter()
        .position(|e| *e == ext)
        .unwrap()
    };
    assert!(
      position(SyntaxExtension::LineBreaks) < position(SyntaxExtension::Alerts)
    );
  }

  #[test]
  fn test_soft_breaks_become_hard() {
    let doc = parse_with("one\ntwo", &ExtensionSet::default());
    let Node::Paragraph(inlines) = first_block(&doc) else {
      panic!("expected paragraph");
    };
    assert!(inlines.contains(&Node::LineBreak));
    assert!(!inlines.contains(&Node::SoftBreak));
  }

  #[test]
  fn test_soft_breaks_kept_when_disabled() {
    let extensions = ExtensionSet {
      hard_breaks: false,
      ..ExtensionSet::default()
    };
    let doc = parse_with("one\ntwo", &extensions);
    let Node::Paragraph(inlines) = first_block(&doc) else {
      panic!("expected paragraph");
    };
    assert!(inlines.contains(&Node::SoftBreak));
  }

  #[test]
  fn test_emoji_shortcodes() {
    let doc =
      parse_with("Ship it :rocket: :not_an_emoji:", &ExtensionSet::default());
    assert_eq!(first_block(&doc).plain_text(), "Ship it 🚀 :not_an_emoji:");
  }

  #[test]
  fn test_emoji_ignored_in_code() {
    let doc = parse_with("`:rocket:`", &ExtensionSet::default());
    let Node::Paragraph(inlines) = first_block(&doc) else {
      panic!("expected paragraph");
    };
    assert_eq!(inlines, &vec![Node::CodeSpan(":rocket:".to_string())]);
  }

  #[test]
  fn test_alert_blockquote() {
    let doc =
      parse_with("> [!WARNING]\n> Mind the gap.", &ExtensionSet::default());
    let Node::Admonition { kind, children } = first_block(&doc) else {
      panic!("expected admonition");
    };
    assert_eq!(*kind, AlertKind::Warning);
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].plain_text(), "Mind the gap.");
  }

  #[test]
  fn test_alert_marker_is_case_insensitive() {
    let doc = parse_with("> [!tip]\n> Use it.", &ExtensionSet::default());
    assert!(matches!(
      first_block(&doc),
      Node::Admonition {
        kind: AlertKind::Tip,
        ..
      }
    ));
  }

  #[test]
  fn test_unknown_alert_stays_blockquote() {
    let doc = parse_with("> [!DANGER]\n> Nope.", &ExtensionSet::default());
    assert!(matches!(first_block(&doc), Node::BlockQuote(_)));
  }

  #[test]
  fn test_marker_alone_drops_paragraph() {
    let doc = parse_with("> [!NOTE]\n>\n> Body", &ExtensionSet::default());
    let Node::Admonition { children, .. } = first_block(&doc) else {
      panic!("expected admonition");
    };
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].plain_text(), "Body");
  }

  #[test]
  fn test_alerts_disabled() {
    let extensions = ExtensionSet {
      alerts: false,
      ..ExtensionSet::default()
    };
    let doc = parse_with("> [!NOTE]\n> Body", &extensions);
    assert!(matches!(first_block(&doc), Node::BlockQuote(_)));
  }

  fn link_urls(node: &Node) -> Vec<String> {
    let mut urls = Vec::new();
    if let Node::Link { url, .. } = node {
      urls.push(url.clone());
    }
    for child in node.children().unwrap_or_default() {
      urls.extend(link_urls(child));
    }
    urls
  }

  #[test]
  fn test_contents_section_is_generated() {
    let doc = parse_with(
      "# Guide\n\n## Contents\n\nold text\n\n## Install\n\n### From \
       source\n\n## Usage",
      &ExtensionSet::default(),
    );
    let blocks = doc.children().unwrap();
    assert_eq!(blocks.len(), 6);
    let Node::List { items, .. } = &blocks[2] else {
      panic!("expected contents list");
    };
    assert_eq!(items.len(), 2);
    assert_eq!(link_urls(&blocks[2]), [
      "#h-install",
      "#h-from-source",
      "#h-usage"
    ]);
    assert!(!doc.plain_text().contains("old text"));
  }

  #[test]
  fn test_contents_links_follow_duplicate_numbering() {
    let doc = parse_with("## TOC\n\n## A\n\n## A", &ExtensionSet::default());
    assert_eq!(link_urls(&doc), ["#h-a", "#h-a-1"]);
  }

  #[test]
  fn test_contents_heading_names() {
    for heading in ["Contents", "Table of Contents", "table-of-content", "toc"] {
      let doc = parse_with(
        &format!("## {heading}\n\n## Next"),
        &ExtensionSet::default(),
      );
      assert_eq!(link_urls(&doc), ["#h-next"], "{heading}");
    }
    let doc = parse_with(
      "## Contents of the box\n\n## Next",
      &ExtensionSet::default(),
    );
    assert!(link_urls(&doc).is_empty());
  }

  #[test]
  fn test_contents_without_closing_heading_is_left_alone() {
    let doc = parse_with("# Contents\n\nintro\n\n## A", &ExtensionSet::default());
    assert_eq!(doc.children().unwrap().len(), 3);
    assert!(link_urls(&doc).is_empty());
  }

  #[test]
  fn test_contents_link_text_drops_nested_links() {
    let doc = parse_with(
      "## Contents\n\n## [Docs](https://example.com)",
      &ExtensionSet::default(),
    );
    let Node::List { items, .. } = &doc.children().unwrap()[1] else {
      panic!("expected contents list");
    };
    assert_eq!(link_urls(&items[0]), ["#h-docs"]);
    assert_eq!(items[0].plain_text(), "Docs");
  }

  #[test]
  fn test_contents_disabled() {
    let extensions = ExtensionSet {
      toc: false,
      ..ExtensionSet::default()
    };
    let doc = parse_with("## Contents\n\n## A", &extensions);
    assert_eq!(doc.children().unwrap().len(), 2);
    assert!(link_urls(&doc).is_empty());
  }
}
