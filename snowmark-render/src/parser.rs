//! Markdown source parsing.
//!
//! comrak does the actual CommonMark/GFM parsing; the resulting arena tree is
//! converted into the owned [`Node`] tree the rest of the pipeline works on.
//! Parsing itself never fails: malformed markdown degrades to literal text.
//! The only error is a document nested deeper than the configured limit.

use comrak::{
  Arena,
  nodes::{AstNode, ListType, NodeHeading, NodeValue, TableAlignment},
  options::Options,
  parse_document,
};
use log::trace;

use crate::{
  ast::{Alignment, Node},
  error::{RenderError, StageResult},
  extensions::{ExtensionSet, SyntaxExtension},
};

/// Build the comrak options for an extension set.
///
/// Raw HTML is always kept in the tree; whether it survives is decided by
/// lowering and sanitization, never by the parser.
#[must_use]
pub fn comrak_options(extensions: &ExtensionSet) -> Options<'static> {
  let mut options = Options::default();
  options.render.r#unsafe = true;

  for extension in SyntaxExtension::ORDER {
    if extensions.is_enabled(extension) {
      extension.configure(&mut options);
    }
  }

  options
}

/// Parse markdown into a document tree.
///
/// # Errors
///
/// Returns [`RenderError::NestingTooDeep`] when the document nests deeper than
/// `max_depth` levels.
pub fn parse(
  markdown: &str,
  extensions: &ExtensionSet,
  max_depth: usize,
) -> StageResult<Node> {
  let arena = Arena::new();
  let options = comrak_options(extensions);
  let root = parse_document(&arena, markdown, &options);

  let mut converter = Converter {
    max_depth,
    depth: 0,
  };
  let document = converter.convert(root)?;
  trace!("Parsed {} bytes of markdown", markdown.len());
  Ok(document)
}

struct Converter {
  max_depth: usize,
  depth:     usize,
}

impl Converter {
  fn convert<'a>(&mut self, node: &'a AstNode<'a>) -> StageResult<Node> {
    self.depth += 1;
    if self.depth > self.max_depth {
      return Err(RenderError::NestingTooDeep {
        limit: self.max_depth,
      });
    }
    let converted = self.convert_value(node);
    self.depth -= 1;
    converted
  }

  fn convert_value<'a>(&mut self, node: &'a AstNode<'a>) -> StageResult<Node> {
    let converted = match &node.data.borrow().value {
      NodeValue::Document => Node::Document(self.children(node)?),
      NodeValue::Heading(NodeHeading { level, .. }) => {
        Node::Heading {
          level:    (*level).clamp(1, 6),
          children: self.children(node)?,
        }
      },
      NodeValue::Paragraph => {
        let children = self.children(node)?;
        match display_math_only(&children) {
          Some(source) => Node::MathBlock(source),
          None => Node::Paragraph(children),
        }
      },
      NodeValue::List(list) => {
        Node::List {
          ordered: matches!(list.list_type, ListType::Ordered),
          start:   list.start,
          tight:   list.tight,
          items:   self.children(node)?,
        }
      },
      NodeValue::Item(_) => Node::ListItem(self.children(node)?),
      NodeValue::Table(table) => {
        Node::Table {
          alignments: table.alignments.iter().map(convert_alignment).collect(),
          rows:       self.children(node)?,
        }
      },
      NodeValue::TableRow(header) => {
        Node::TableRow {
          header: *header,
          cells:  self.children(node)?,
        }
      },
      NodeValue::TableCell => Node::TableCell(self.children(node)?),
      NodeValue::CodeBlock(code) if code.info.trim() == "math" => {
        Node::MathBlock(code.literal.trim().to_string())
      },
      NodeValue::CodeBlock(code) => {
        Node::CodeBlock {
          info:    code.info.trim().to_string(),
          literal: code.literal.clone(),
        }
      },
      NodeValue::Code(code) => Node::CodeSpan(code.literal.clone()),
      NodeValue::Math(math) => {
        Node::MathSpan {
          display: math.display_math,
          source:  math.literal.trim().to_string(),
        }
      },
      NodeValue::Link(link) => {
        Node::Link {
          url:      link.url.to_string(),
          title:    link.title.to_string(),
          children: self.children(node)?,
        }
      },
      NodeValue::Image(link) => {
        Node::Image {
          url:      link.url.to_string(),
          title:    link.title.to_string(),
          children: self.children(node)?,
        }
      },
      NodeValue::Emph => Node::Emphasis(self.children(node)?),
      NodeValue::Strong => Node::Strong(self.children(node)?),
      NodeValue::Strikethrough => Node::Strikethrough(self.children(node)?),
      NodeValue::BlockQuote => Node::BlockQuote(self.children(node)?),
      NodeValue::HtmlBlock(block) => {
        Node::RawHtml {
          block: true,
          html:  block.literal.clone(),
        }
      },
      NodeValue::HtmlInline(html) => {
        Node::RawHtml {
          block: false,
          html:  html.to_string(),
        }
      },
      NodeValue::Text(text) => Node::Text(text.to_string()),
      NodeValue::SoftBreak => Node::SoftBreak,
      NodeValue::LineBreak => Node::LineBreak,
      NodeValue::ThematicBreak => Node::ThematicBreak,
      // Constructs of extensions that are never enabled keep their content.
      _ => Node::Paragraph(self.children(node)?),
    };
    Ok(converted)
  }

  fn children<'a>(&mut self, node: &'a AstNode<'a>) -> StageResult<Vec<Node>> {
    let mut children: Vec<Node> = Vec::new();
    for child in node.children() {
      let converted = self.convert(child)?;
      if let (Node::Text(incoming), Some(Node::Text(previous))) =
        (&converted, children.last_mut())
      {
        previous.push_str(incoming);
        continue;
      }
      children.push(converted);
    }
    Ok(children)
  }
}

const fn convert_alignment(alignment: &TableAlignment) -> Alignment {
  match alignment {
    TableAlignment::None => Alignment::None,
    TableAlignment::Left => Alignment::Left,
    TableAlignment::Center => Alignment::Center,
    TableAlignment::Right => Alignment::Right,
  }
}

/// Source of a paragraph that holds nothing but one display math span.
fn display_math_only(children: &[Node]) -> Option<String> {
  let mut content = children.iter().filter(|child| {
    !matches!(child, Node::SoftBreak | Node::LineBreak)
      && !matches!(child, Node::Text(t) if t.trim().is_empty())
  });

  match (content.next(), content.next()) {
    (
      Some(Node::MathSpan {
        display: true,
        source,
      }),
      None,
    ) => Some(source.clone()),
    _ => None,
  }
}
