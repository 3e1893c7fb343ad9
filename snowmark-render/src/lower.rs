//! Lowering: document tree to markup tree.

use log::trace;

use crate::{
  ast::{AlertKind, Alignment, Node},
  error::StageResult,
  markup::{Element, MarkupNode, MarkupTree, parse_fragment, serialize},
};

/// Options for [`lower`].
#[derive(Debug, Clone, Copy)]
pub struct LowerOptions {
  /// Re-parse embedded raw HTML into elements. When off, raw HTML is kept as
  /// escaped text.
  pub allow_embedded_markup: bool,
  pub max_nesting_depth:     usize,
}

/// Convert a document tree into a markup tree.
///
/// # Errors
///
/// Fails only when embedded markup is re-parsed and the result nests too
/// deeply, or cannot be read back.
pub fn lower(document: &Node, options: LowerOptions) -> StageResult<MarkupTree> {
  let mut tree = MarkupTree::new(join_blocks(block_children(document)));

  if tree.contains_raw() {
    if options.allow_embedded_markup {
      trace!("Re-parsing embedded markup");
      let html = serialize(&tree)?;
      tree = MarkupTree::new(parse_fragment(&html, options.max_nesting_depth)?);
    } else {
      raw_to_text(&mut tree.children);
    }
  }

  Ok(tree)
}

fn raw_to_text(nodes: &mut [MarkupNode]) {
  for node in nodes {
    match node {
      MarkupNode::Raw(raw) => *node = MarkupNode::Text(std::mem::take(raw)),
      MarkupNode::Element(element) => raw_to_text(&mut element.children),
      MarkupNode::Text(_) => {},
    }
  }
}

fn block_children(node: &Node) -> Vec<MarkupNode> {
  node
    .children()
    .unwrap_or_default()
    .iter()
    .flat_map(lower_node)
    .collect()
}

fn inline_children(children: &[Node]) -> Vec<MarkupNode> {
  children.iter().flat_map(lower_node).collect()
}

/// Blocks separated by newlines.
fn join_blocks(blocks: Vec<MarkupNode>) -> Vec<MarkupNode> {
  let mut joined = Vec::with_capacity(blocks.len() * 2);
  for (index, block) in blocks.into_iter().enumerate() {
    if index > 0 {
      joined.push(MarkupNode::text("\n"));
    }
    joined.push(block);
  }
  joined
}

/// Blocks separated, preceded and followed by newlines.
fn wrap_blocks(blocks: Vec<MarkupNode>) -> Vec<MarkupNode> {
  if blocks.is_empty() {
    return blocks;
  }
  let mut wrapped = vec![MarkupNode::text("\n")];
  wrapped.extend(join_blocks(blocks));
  wrapped.push(MarkupNode::text("\n"));
  wrapped
}

fn lower_node(node: &Node) -> Vec<MarkupNode> {
  let element = match node {
    Node::Document(_) => return join_blocks(block_children(node)),
    Node::Heading { level, children } => {
      Element::new(format!("h{level}")).with_children(inline_children(children))
    },
    Node::Paragraph(children) => {
      Element::new("p").with_children(inline_children(children))
    },
    Node::List {
      ordered,
      start,
      tight,
      items,
    } => lower_list(*ordered, *start, *tight, items),
    // Items are lowered by their list.
    Node::ListItem(children) => lower_list_item(children, false),
    Node::Table { alignments, rows } => lower_table(alignments, rows),
    Node::TableRow { cells, .. } => {
      Element::new("tr").with_children(wrap_blocks(inline_children(cells)))
    },
    Node::TableCell(children) => {
      Element::new("td").with_children(inline_children(children))
    },
    Node::CodeBlock { info, literal } => lower_code_block(info, literal),
    Node::CodeSpan(code) => Element::new("code").with_text(code.clone()),
    Node::MathBlock(source) => {
      Element::new("div")
        .with_attr("class", "math math-display")
        .with_text(source.clone())
    },
    Node::MathSpan { display, source } => {
      let class = if *display {
        "math math-display"
      } else {
        "math math-inline"
      };
      Element::new("span")
        .with_attr("class", class)
        .with_text(source.clone())
    },
    Node::Link {
      url,
      title,
      children,
    } => {
      let mut link = Element::new("a").with_attr("href", url.clone());
      if !title.is_empty() {
        link = link.with_attr("title", title.clone());
      }
      link.with_children(inline_children(children))
    },
    Node::Image {
      url,
      title,
      children,
    } => {
      let mut image = Element::new("img")
        .with_attr("src", url.clone())
        .with_attr("alt", node_text(children));
      if !title.is_empty() {
        image = image.with_attr("title", title.clone());
      }
      image
    },
    Node::Emphasis(children) => {
      Element::new("em").with_children(inline_children(children))
    },
    Node::Strong(children) => {
      Element::new("strong").with_children(inline_children(children))
    },
    Node::Strikethrough(children) => {
      Element::new("del").with_children(inline_children(children))
    },
    Node::BlockQuote(children) => {
      Element::new("blockquote")
        .with_children(wrap_blocks(inline_children(children)))
    },
    Node::Admonition { kind, children } => lower_alert(*kind, children),
    Node::RawHtml { html, .. } => return vec![MarkupNode::Raw(html.clone())],
    Node::Text(text) => return vec![MarkupNode::text(text.clone())],
    Node::SoftBreak => return vec![MarkupNode::text("\n")],
    Node::LineBreak => {
      return vec![Element::new("br").into(), MarkupNode::text("\n")];
    },
    Node::ThematicBreak => Element::new("hr"),
  };
  vec![element.into()]
}

fn node_text(children: &[Node]) -> String {
  children.iter().map(Node::plain_text).collect()
}

fn lower_list(ordered: bool, start: usize, tight: bool, items: &[Node]) -> Element {
  let mut list = if ordered {
    Element::new("ol")
  } else {
    Element::new("ul")
  };
  if ordered && start != 1 {
    list = list.with_attr("start", start.to_string());
  }

  let items = items
    .iter()
    .map(|item| {
      match item {
        Node::ListItem(children) => lower_list_item(children, tight).into(),
        other => lower_list_item(std::slice::from_ref(other), tight).into(),
      }
    })
    .collect();
  list.with_children(wrap_blocks(items))
}

/// Paragraphs of tight list items are unwrapped into the item.
fn lower_list_item(children: &[Node], tight: bool) -> Element {
  let mut blocks: Vec<MarkupNode> = Vec::new();
  let mut unwrapped_any = false;
  for child in children {
    match child {
      Node::Paragraph(inlines) if tight => {
        if !blocks.is_empty() {
          blocks.push(MarkupNode::text("\n"));
        }
        blocks.extend(inline_children(inlines));
        unwrapped_any = true;
      },
      other => {
        if unwrapped_any || !blocks.is_empty() {
          blocks.push(MarkupNode::text("\n"));
        }
        blocks.extend(lower_node(other));
      },
    }
  }

  let only_inline = children
    .iter()
    .all(|child| tight && matches!(child, Node::Paragraph(_)));
  if !only_inline && !blocks.is_empty() {
    blocks.insert(0, MarkupNode::text("\n"));
    blocks.push(MarkupNode::text("\n"));
  }

  Element::new("li").with_children(blocks)
}

fn lower_table(alignments: &[Alignment], rows: &[Node]) -> Element {
  let mut head: Vec<MarkupNode> = Vec::new();
  let mut body: Vec<MarkupNode> = Vec::new();

  for row in rows {
    let Node::TableRow { header, cells } = row else {
      continue;
    };
    let cell_name = if *header { "th" } else { "td" };
    let cells = cells
      .iter()
      .enumerate()
      .map(|(column, cell)| {
        let mut element = Element::new(cell_name)
          .with_children(inline_children(cell.children().unwrap_or_default()));
        if let Some(align) = alignments.get(column).and_then(|a| a.as_attr()) {
          element = element.with_attr("align", align);
        }
        element.into()
      })
      .collect();
    let tr = Element::new("tr").with_children(wrap_blocks(cells)).into();
    if *header {
      head.push(tr);
    } else {
      body.push(tr);
    }
  }

  let mut sections = Vec::new();
  if !head.is_empty() {
    sections.push(Element::new("thead").with_children(wrap_blocks(head)).into());
  }
  if !body.is_empty() {
    sections.push(Element::new("tbody").with_children(wrap_blocks(body)).into());
  }
  Element::new("table").with_children(wrap_blocks(sections))
}

fn lower_code_block(info: &str, literal: &str) -> Element {
  let mut code = Element::new("code");
  if let Some(language) = info.split_whitespace().next() {
    code = code.with_attr("class", format!("language-{language}"));
  }
  Element::new("pre").with_children(vec![code.with_text(literal).into()])
}

fn lower_alert(kind: AlertKind, children: &[Node]) -> Element {
  let icon = Element::new("svg")
    .with_attr("class", "octicon")
    .with_attr("viewBox", "0 0 16 16")
    .with_attr("width", "16")
    .with_attr("height", "16")
    .with_attr("aria-hidden", "true")
    .with_children(vec![
      Element::new("path").with_attr("d", octicon_path(kind)).into(),
    ]);
  let title = Element::new("p")
    .with_attr("class", "markdown-alert-title")
    .with_children(vec![icon.into(), MarkupNode::text(kind.title())]);

  let mut blocks = vec![title.into()];
  blocks.extend(children.iter().flat_map(lower_node));

  Element::new("div")
    .with_attr(
      "class",
      format!("markdown-alert markdown-alert-{}", kind.keyword()),
    )
    .with_children(wrap_blocks(blocks))
}

/// Path data of the 16px octicon shown in an alert title.
const fn octicon_path(kind: AlertKind) -> &'static str {
  match kind {
    AlertKind::Note => {
      "M0 8a8 8 0 1 1 16 0A8 8 0 0 1 0 8Zm8-6.5a6.5 6.5 0 1 0 0 13 6.5 6.5 0 0 \
       0 0-13ZM6.5 7.75A.75.75 0 0 1 7.25 7h1a.75.75 0 0 1 .75.75v2.75h.25a.75.75 \
       0 0 1 0 1.5h-2a.75.75 0 0 1 0-1.5h.25v-2h-.25a.75.75 0 0 \
       1-.75-.75ZM8 6a1 1 0 1 1 0-2 1 1 0 0 1 0 2Z"
    },
    AlertKind::Tip => {
      "M8 1.5c-2.363 0-4 1.69-4 3.75 0 .984.424 1.625.984 \
       2.304l.214.253c.223.264.47.556.673.848.284.411.537.896.621 1.49a.75.75 \
       0 0 1-1.484.211c-.04-.282-.163-.547-.37-.847a8.456 8.456 0 0 \
       0-.542-.68c-.084-.1-.173-.205-.268-.32C3.201 7.75 2.5 6.766 2.5 5.25 \
       2.5 2.31 4.863 0 8 0s5.5 2.31 5.5 5.25c0 1.516-.701 2.5-1.328 \
       3.259-.095.115-.184.22-.268.319-.207.245-.383.453-.541.681-.208.3-.33.\
       565-.37.847a.751.751 0 0 1-1.485-.212c.084-.593.337-1.078.621-1.489.\
       203-.292.45-.584.673-.848.075-.088.147-.173.213-.253.561-.679.985-1.32.\
       985-2.304 0-2.06-1.637-3.75-4-3.75ZM5.75 12h4.5a.75.75 0 0 1 0 \
       1.5h-4.5a.75.75 0 0 1 0-1.5ZM6 15.25a.75.75 0 0 1 .75-.75h2.5a.75.75 0 \
       0 1 0 1.5h-2.5a.75.75 0 0 1-.75-.75Z"
    },
    AlertKind::Important => {
      "M0 1.75C0 .784.784 0 1.75 0h12.5C15.216 0 16 .784 16 1.75v9.5A1.75 \
       1.75 0 0 1 14.25 13H8.06l-2.573 2.573A1.458 1.458 0 0 1 3 \
       14.543V13H1.75A1.75 1.75 0 0 1 0 11.25Zm1.75-.25a.25.25 0 0 \
       0-.25.25v9.5c0 .138.112.25.25.25h2a.75.75 0 0 1 .75.75v2.19l2.72-2.\
       72a.749.749 0 0 1 .53-.22h6.5a.25.25 0 0 0 .25-.25v-9.5a.25.25 0 0 \
       0-.25-.25Zm7 2.25v2.5a.75.75 0 0 1-1.5 0v-2.5a.75.75 0 0 1 1.5 0ZM9 \
       9a1 1 0 1 1-2 0 1 1 0 0 1 2 0Z"
    },
    AlertKind::Warning => {
      "M6.457 1.047c.659-1.234 2.427-1.234 3.086 0l6.082 11.378A1.75 1.75 0 0 \
       1 14.082 15H1.918a1.75 1.75 0 0 1-1.543-2.575Zm1.763.707a.25.25 0 0 \
       0-.44 0L1.698 13.132a.25.25 0 0 0 .22.368h12.164a.25.25 0 0 0 \
       .22-.368Zm.53 3.996v2.5a.75.75 0 0 1-1.5 0v-2.5a.75.75 0 0 1 1.5 0ZM9 \
       11a1 1 0 1 1-2 0 1 1 0 0 1 2 0Z"
    },
    AlertKind::Caution => {
      "M4.47.22A.749.749 0 0 1 5 0h6c.199 0 .389.079.53.22l4.25 \
       4.25c.141.14.22.331.22.53v6a.749.749 0 0 1-.22.53l-4.25 4.25A.749.749 \
       0 0 1 11 16H5a.749.749 0 0 1-.53-.22L.22 11.53A.749.749 0 0 1 0 11V5c0-.\
       199.079-.389.22-.53Zm.84 1.28L1.5 5.31v5.38l3.81 3.81h5.38l3.81-3.\
       81V5.31L10.69 1.5ZM8 4a.75.75 0 0 1 .75.75v3.5a.75.75 0 0 1-1.5 \
       0v-3.5A.75.75 0 0 1 8 4Zm0 8a1 1 0 1 1 0-2 1 1 0 0 1 0 2Z"
    },
  }
}
