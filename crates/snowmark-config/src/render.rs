use serde::{Deserialize, Serialize};
use snowmark_render::{
  ExtensionSet,
  RenderOptions,
  processor::{
    DEFAULT_FALLBACK_MESSAGE,
    DEFAULT_HEADING_ID_PREFIX,
    DEFAULT_MAX_NESTING_DEPTH,
  },
};

use crate::error::ConfigError;

/// Configuration of the markdown renderer, the `[render]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools, reason = "One toggle per option")]
pub struct RenderConfig {
  /// GitHub Flavored Markdown: tables, autolinks and strikethrough.
  pub gfm: bool,

  /// Turn every single newline into a line break.
  pub hard_breaks: bool,

  /// Dollar-delimited math rendered to `MathML`.
  pub math: bool,

  /// `:shortcode:` emoji.
  pub emoji: bool,

  /// `> [!NOTE]` style alert blocks.
  pub alerts: bool,

  /// Link list generated under a "Contents" heading.
  pub toc: bool,

  /// Keep raw HTML from the source as (sanitized) elements instead of
  /// escaping it.
  pub allow_embedded_markup: bool,

  /// Whether to enable syntax highlighting for code blocks.
  pub highlight_code: bool,

  /// Prefix of generated heading ids.
  pub heading_id_prefix: String,

  /// Message shown in place of a document that failed to render.
  pub fallback_message: String,

  /// Documents nesting deeper than this render the fallback message.
  pub max_nesting_depth: usize,

  /// Highlighting theme used for the generated stylesheet.
  pub theme: Option<String>,
}

impl Default for RenderConfig {
  fn default() -> Self {
    Self {
      gfm:                   true,
      hard_breaks:           true,
      math:                  true,
      emoji:                 true,
      alerts:                true,
      toc:                   true,
      allow_embedded_markup: true,
      highlight_code:        true,
      heading_id_prefix:     DEFAULT_HEADING_ID_PREFIX.to_string(),
      fallback_message:      DEFAULT_FALLBACK_MESSAGE.to_string(),
      max_nesting_depth:     DEFAULT_MAX_NESTING_DEPTH,
      theme:                 None,
    }
  }
}

/// A `[render]` table as written in one config file.
///
/// Keys the file leaves out stay `None`, so merging the layer keeps whatever
/// an earlier file or the defaults set for them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderLayer {
  pub gfm:                   Option<bool>,
  pub hard_breaks:           Option<bool>,
  pub math:                  Option<bool>,
  pub emoji:                 Option<bool>,
  pub alerts:                Option<bool>,
  pub toc:                   Option<bool>,
  pub allow_embedded_markup: Option<bool>,
  pub highlight_code:        Option<bool>,
  pub heading_id_prefix:     Option<String>,
  pub fallback_message:      Option<String>,
  pub max_nesting_depth:     Option<usize>,
  pub theme:                 Option<String>,
}

/// Copy every `Some` field of a layer onto the matching field of a config.
macro_rules! merge_fields {
  ($layer:ident => $config:ident: $($field:ident),+ $(,)?) => {
    $(
      if let Some(value) = $layer.$field {
        $config.$field = value;
      }
    )+
  };
}

impl RenderConfig {
  /// Merge a config file layer into this table, field by field.
  pub fn merge(&mut self, layer: RenderLayer) {
    let config = self;
    merge_fields!(layer => config:
      gfm,
      hard_breaks,
      math,
      emoji,
      alerts,
      toc,
      allow_embedded_markup,
      highlight_code,
      heading_id_prefix,
      fallback_message,
      max_nesting_depth,
    );
    if layer.theme.is_some() {
      config.theme = layer.theme;
    }
  }

  /// Renderer options described by this configuration.
  #[must_use]
  pub fn to_render_options(&self) -> RenderOptions {
    RenderOptions {
      extensions:            ExtensionSet {
        gfm:         self.gfm,
        hard_breaks: self.hard_breaks,
        math:        self.math,
        emoji:       self.emoji,
        alerts:      self.alerts,
        toc:         self.toc,
      },
      allow_embedded_markup: self.allow_embedded_markup,
      highlight_code:        self.highlight_code,
      heading_id_prefix:     self.heading_id_prefix.clone(),
      fallback_message:      self.fallback_message.clone(),
      max_nesting_depth:     self.max_nesting_depth,
    }
  }

  /// Apply a single `key=value` override to this table.
  ///
  /// # Errors
  ///
  /// Returns an error if the key is unknown or the value has the wrong type.
  pub fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    match key {
      "gfm" => self.gfm = parse_bool(key, value)?,
      "hard_breaks" => self.hard_breaks = parse_bool(key, value)?,
      "math" => self.math = parse_bool(key, value)?,
      "emoji" => self.emoji = parse_bool(key, value)?,
      "alerts" => self.alerts = parse_bool(key, value)?,
      "toc" => self.toc = parse_bool(key, value)?,
      "allow_embedded_markup" => {
        self.allow_embedded_markup = parse_bool(key, value)?;
      },
      "highlight_code" => self.highlight_code = parse_bool(key, value)?,
      "heading_id_prefix" => self.heading_id_prefix = value.to_string(),
      "fallback_message" => self.fallback_message = value.to_string(),
      "max_nesting_depth" => {
        self.max_nesting_depth = parse_usize(key, value)?;
      },
      "theme" => {
        self.theme = (!value.is_empty()).then(|| value.to_string());
      },
      _ => {
        return Err(ConfigError::Config(format!(
          "Unknown configuration key: 'render.{key}'. See documentation for \
           supported keys."
        )));
      },
    }
    Ok(())
  }

  /// Check values that deserialize fine but cannot be rendered with.
  ///
  /// # Errors
  ///
  /// Returns an error describing the first invalid value.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.max_nesting_depth == 0 {
      return Err(ConfigError::Config(
        "render.max_nesting_depth must be at least 1".to_string(),
      ));
    }
    if self.fallback_message.trim().is_empty() {
      return Err(ConfigError::Config(
        "render.fallback_message must not be empty".to_string(),
      ));
    }
    Ok(())
  }
}

pub(crate) fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
  match value.to_lowercase().as_str() {
    "true" | "yes" | "1" => Ok(true),
    "false" | "no" | "0" => Ok(false),
    _ => {
      Err(ConfigError::Config(format!(
        "Invalid boolean value for '{key}': '{value}'. Expected true/false, \
         yes/no, or 1/0"
      )))
    },
  }
}

pub(crate) fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
  value.parse().map_err(|_| {
    ConfigError::Config(format!(
      "Invalid value for '{key}': '{value}'. Expected a positive integer"
    ))
  })
}
