//! Document AST produced by the parser and rewritten by syntax extensions.
//!
//! The tree is owned and mutable: extensions walk it with
//! [`Node::children_mut`] and replace nodes in place. Children are always in
//! document order.

/// Column alignment of a GFM table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
  None,
  Left,
  Center,
  Right,
}

impl Alignment {
  /// Value of the `align` attribute, if any.
  #[must_use]
  pub const fn as_attr(self) -> Option<&'static str> {
    match self {
      Self::None => None,
      Self::Left => Some("left"),
      Self::Center => Some("center"),
      Self::Right => Some("right"),
    }
  }
}

/// Severity of an alert (admonition) block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
  Note,
  Tip,
  Important,
  Warning,
  Caution,
}

impl AlertKind {
  pub const ALL: [Self; 5] = [
    Self::Note,
    Self::Tip,
    Self::Important,
    Self::Warning,
    Self::Caution,
  ];

  /// Parse a marker keyword such as `NOTE`, case-insensitively.
  #[must_use]
  pub fn from_keyword(keyword: &str) -> Option<Self> {
    Self::ALL
      .into_iter()
      .find(|kind| kind.keyword().eq_ignore_ascii_case(keyword))
  }

  /// Lowercase keyword, used in class names.
  #[must_use]
  pub const fn keyword(self) -> &'static str {
    match self {
      Self::Note => "note",
      Self::Tip => "tip",
      Self::Important => "important",
      Self::Warning => "warning",
      Self::Caution => "caution",
    }
  }

  /// Title shown above the alert body.
  #[must_use]
  pub const fn title(self) -> &'static str {
    match self {
      Self::Note => "Note",
      Self::Tip => "Tip",
      Self::Important => "Important",
      Self::Warning => "Warning",
      Self::Caution => "Caution",
    }
  }
}

/// A node of the markdown document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
  Document(Vec<Node>),
  Heading {
    level:    u8,
    children: Vec<Node>,
  },
  Paragraph(Vec<Node>),
  List {
    ordered: bool,
    start:   usize,
    tight:   bool,
    items:   Vec<Node>,
  },
  ListItem(Vec<Node>),
  Table {
    alignments: Vec<Alignment>,
    rows:       Vec<Node>,
  },
  TableRow {
    header: bool,
    cells:  Vec<Node>,
  },
  TableCell(Vec<Node>),
  CodeBlock {
    info:    String,
    literal: String,
  },
  CodeSpan(String),
  MathBlock(String),
  MathSpan {
    display: bool,
    source:  String,
  },
  Link {
    url:      String,
    title:    String,
    children: Vec<Node>,
  },
  Image {
    url:      String,
    title:    String,
    children: Vec<Node>,
  },
  Emphasis(Vec<Node>),
  Strong(Vec<Node>),
  Strikethrough(Vec<Node>),
  BlockQuote(Vec<Node>),
  Admonition {
    kind:     AlertKind,
    children: Vec<Node>,
  },
  RawHtml {
    block: bool,
    html:  String,
  },
  Text(String),
  SoftBreak,
  LineBreak,
  ThematicBreak,
}

impl Node {
  /// Child nodes, or `None` for leaves.
  #[must_use]
  pub fn children(&self) -> Option<&[Self]> {
    match self {
      Self::Document(children)
      | Self::Heading { children, .. }
      | Self::Paragraph(children)
      | Self::List {
        items: children, ..
      }
      | Self::ListItem(children)
      | Self::Table { rows: children, .. }
      | Self::TableRow {
        cells: children, ..
      }
      | Self::TableCell(children)
      | Self::Link { children, .. }
      | Self::Image { children, .. }
      | Self::Emphasis(children)
      | Self::Strong(children)
      | Self::Strikethrough(children)
      | Self::BlockQuote(children)
      | Self::Admonition { children, .. } => Some(children),
      Self::CodeBlock { .. }
      | Self::CodeSpan(_)
      | Self::MathBlock(_)
      | Self::MathSpan { .. }
      | Self::RawHtml { .. }
      | Self::Text(_)
      | Self::SoftBreak
      | Self::LineBreak
      | Self::ThematicBreak => None,
    }
  }

  /// Mutable child nodes, or `None` for leaves.
  pub fn children_mut(&mut self) -> Option<&mut Vec<Self>> {
    match self {
      Self::Document(children)
      | Self::Heading { children, .. }
      | Self::Paragraph(children)
      | Self::List {
        items: children, ..
      }
      | Self::ListItem(children)
      | Self::Table { rows: children, .. }
      | Self::TableRow {
        cells: children, ..
      }
      | Self::TableCell(children)
      | Self::Link { children, .. }
      | Self::Image { children, .. }
      | Self::Emphasis(children)
      | Self::Strong(children)
      | Self::Strikethrough(children)
      | Self::BlockQuote(children)
      | Self::Admonition { children, .. } => Some(children),
      Self::CodeBlock { .. }
      | Self::CodeSpan(_)
      | Self::MathBlock(_)
      | Self::MathSpan { .. }
      | Self::RawHtml { .. }
      | Self::Text(_)
      | Self::SoftBreak
      | Self::LineBreak
      | Self::ThematicBreak => None,
    }
  }

  /// Concatenated text of all descendant text-like leaves.
  ///
  /// Code spans and math contribute their source, breaks a single space.
  #[must_use]
  pub fn plain_text(&self) -> String {
    let mut text = String::new();
    self.collect_text(&mut text);
    text
  }

  fn collect_text(&self, out: &mut String) {
    match self {
      Self::Text(t) | Self::CodeSpan(t) => out.push_str(t),
      Self::MathSpan { source, .. } => out.push_str(source),
      Self::SoftBreak | Self::LineBreak => out.push(' '),
      other => {
        for child in other.children().unwrap_or_default() {
          child.collect_text(out);
        }
      },
    }
  }
}
