//! The allow-list policy applied by the sanitizer.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Wildcard key of [`AllowListPolicy::attributes`] applying to every tag.
pub const ANY_TAG: &str = "*";

/// What the sanitizer lets through.
///
/// The policy is built once and shared read-only by every render. Names are
/// matched ASCII case-insensitively; [`AllowListPolicy::normalized`] lowercases
/// a policy read from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AllowListPolicy {
  /// Elements that are kept. Other elements are unwrapped.
  pub tag_names: BTreeSet<String>,

  /// Allowed attributes per tag, and for all tags under `*`. An entry ending
  /// in `*`, such as `data-*`, allows every attribute with that prefix.
  pub attributes: BTreeMap<String, BTreeSet<String>>,

  /// URL schemes allowed per attribute, such as `href` or `src`.
  pub protocols: BTreeMap<String, BTreeSet<String>>,

  /// Elements removed together with their content.
  pub strip: BTreeSet<String>,

  /// Attributes forced onto an element, overriding the source.
  pub required: BTreeMap<String, BTreeMap<String, String>>,
}

fn set(items: &[&str]) -> BTreeSet<String> {
  items.iter().map(|item| (*item).to_string()).collect()
}

impl Default for AllowListPolicy {
  fn default() -> Self {
    let tag_names = set(&[
      // Text and structure
      "div", "span", "p", "br", "hr", "h1", "h2", "h3", "h4", "h5", "h6",
      "strong", "em", "b", "i", "u", "s", "mark", "small", "blockquote", "pre",
      "code", "ul", "ol", "li", "dl", "dt", "dd", "table", "thead", "tbody",
      "tfoot", "tr", "th", "td", "a", "img", "del", "ins", "kbd", "q", "rp",
      "rt", "ruby", "samp", "sub", "sup", "tt", "var", "picture", "source",
      "strike", "summary", "details", "section", "input", "aside",
      // MathML
      "math", "semantics", "mrow", "mi", "mo", "mn", "msup", "msub",
      "msubsup", "mfrac", "msqrt", "mroot", "munder", "mover", "munderover",
      "mtable", "mtr", "mtd", "mspace", "mtext", "annotation", "mstyle",
      "merror", "mpadded", "mphantom", "menclose",
      // SVG
      "svg", "g", "path", "rect", "circle", "ellipse", "line", "polyline",
      "polygon", "text", "tspan", "defs", "marker", "use",
    ]);

    let mut attributes = BTreeMap::new();
    let mut allow = |tag: &str, names: &[&str]| {
      attributes.insert(tag.to_string(), set(names));
    };
    allow(ANY_TAG, &[
      "id", "class", "style", "title", "dir", "lang", "data-*", "aria-*",
    ]);
    allow("a", &["href", "title", "target", "rel"]);
    allow("img", &[
      "src", "alt", "title", "width", "height", "loading", "decoding",
    ]);
    allow("input", &["type", "disabled", "checked", "value"]);
    allow("ol", &["start"]);
    allow("th", &["scope", "colspan", "rowspan", "headers", "align"]);
    allow("td", &["colspan", "rowspan", "headers", "align"]);
    allow("table", &["summary"]);
    allow("details", &["open"]);
    allow("source", &["srcset", "media", "type"]);
    allow("svg", &[
      "width",
      "height",
      "viewbox",
      "xmlns",
      "fill",
      "stroke",
      "preserveaspectratio",
    ]);
    allow("path", &["d", "fill", "stroke", "stroke-width"]);
    allow("g", &["fill", "stroke", "transform"]);
    allow("rect", &["x", "y", "width", "height", "rx", "ry", "fill", "stroke"]);
    allow("circle", &["cx", "cy", "r", "fill", "stroke"]);
    allow("ellipse", &["cx", "cy", "rx", "ry", "fill", "stroke"]);
    allow("line", &["x1", "y1", "x2", "y2", "stroke", "stroke-width"]);
    allow("polyline", &["points", "fill", "stroke"]);
    allow("polygon", &["points", "fill", "stroke"]);
    allow("text", &["x", "y", "fill", "font-size", "text-anchor"]);
    allow("tspan", &["x", "y", "dx", "dy"]);
    allow("marker", &[
      "markerwidth",
      "markerheight",
      "refx",
      "refy",
      "orient",
    ]);
    allow("use", &["href"]);
    allow("math", &["xmlns", "display"]);
    allow("mo", &[
      "form",
      "fence",
      "separator",
      "lspace",
      "rspace",
      "stretchy",
      "symmetric",
      "maxsize",
      "minsize",
      "largeop",
      "movablelimits",
    ]);
    allow("mi", &["mathvariant", "mathcolor"]);
    allow("mn", &["mathvariant", "mathcolor"]);
    allow("mfrac", &["linethickness", "numalign", "denomalign"]);
    allow("mspace", &["width", "height", "depth"]);
    allow("mstyle", &["displaystyle", "scriptlevel", "mathvariant"]);
    allow("mtable", &["columnalign", "rowspacing", "columnspacing"]);
    allow("mtd", &["columnalign"]);
    allow("menclose", &["notation"]);
    allow("mpadded", &["width", "height", "depth", "lspace", "rspace"]);
    allow("annotation", &["encoding"]);

    let mut protocols = BTreeMap::new();
    protocols.insert("href".to_string(), set(&["http", "https", "mailto", "tel"]));
    protocols.insert("src".to_string(), set(&["http", "https", "data"]));

    let strip = set(&[
      "script", "style", "iframe", "object", "embed", "template", "noscript",
      "textarea", "title", "xmp", "noembed", "noframes", "plaintext",
    ]);

    let mut required = BTreeMap::new();
    required.insert(
      "input".to_string(),
      BTreeMap::from([
        ("type".to_string(), "checkbox".to_string()),
        ("disabled".to_string(), String::new()),
      ]),
    );

    Self {
      tag_names,
      attributes,
      protocols,
      strip,
      required,
    }
  }
}

impl AllowListPolicy {
  /// A policy that allows nothing: every element is unwrapped to its text.
  #[must_use]
  pub fn text_only() -> Self {
    Self {
      tag_names:  BTreeSet::new(),
      attributes: BTreeMap::new(),
      protocols:  BTreeMap::new(),
      strip:      Self::default().strip,
      required:   BTreeMap::new(),
    }
  }

  /// Lowercase every tag and attribute name.
  #[must_use]
  pub fn normalized(self) -> Self {
    fn lower_set(set: BTreeSet<String>) -> BTreeSet<String> {
      set.into_iter().map(|s| s.to_ascii_lowercase()).collect()
    }

    Self {
      tag_names:  lower_set(self.tag_names),
      attributes: self
        .attributes
        .into_iter()
        .map(|(tag, names)| (tag.to_ascii_lowercase(), lower_set(names)))
        .collect(),
      protocols:  self
        .protocols
        .into_iter()
        .map(|(attr, schemes)| (attr.to_ascii_lowercase(), lower_set(schemes)))
        .collect(),
      strip:      lower_set(self.strip),
      required:   self
        .required
        .into_iter()
        .map(|(tag, attrs)| {
          let attrs = attrs
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();
          (tag.to_ascii_lowercase(), attrs)
        })
        .collect(),
    }
  }

  /// Whether the element is kept. `tag` must be lowercase.
  #[must_use]
  pub fn allows_tag(&self, tag: &str) -> bool {
    self.tag_names.contains(tag)
  }

  /// Whether the element is removed with its content. `tag` must be lowercase.
  #[must_use]
  pub fn strips(&self, tag: &str) -> bool {
    self.strip.contains(tag)
  }

  /// Whether `attribute` may appear on `tag`. Both must be lowercase.
  #[must_use]
  pub fn allows_attribute(&self, tag: &str, attribute: &str) -> bool {
    [tag, ANY_TAG]
      .into_iter()
      .filter_map(|key| self.attributes.get(key))
      .flatten()
      .any(|pattern| {
        match pattern.strip_suffix('*') {
          Some(prefix) => {
            attribute.len() > prefix.len() && attribute.starts_with(prefix)
          },
          None => pattern == attribute,
        }
      })
  }

  /// Allowed URL schemes for an attribute, if it carries a URL.
  #[must_use]
  pub fn protocols_for(&self, attribute: &str) -> Option<&BTreeSet<String>> {
    self.protocols.get(attribute)
  }

  /// Attributes forced onto an element.
  #[must_use]
  pub fn required_for(&self, tag: &str) -> Option<&BTreeMap<String, String>> {
    self.required.get(tag)
  }
}
