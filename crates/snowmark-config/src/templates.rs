use std::fmt;

/// Error type for template operations.
#[derive(Debug)]
pub enum TemplateError {
  /// Indicates that the requested configuration format is not supported.
  /// Contains the name of the unsupported format.
  UnsupportedFormat(String),
}

impl fmt::Display for TemplateError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::UnsupportedFormat(format) => {
        write!(f, "Unsupported config format: {format}")
      },
    }
  }
}

impl std::error::Error for TemplateError {}

/// Default configuration template in TOML, commented so that each field
/// explains itself.
pub const DEFAULT_TOML_TEMPLATE: &str = r#"# Snowmark Configuration File

# Number of threads to use when rendering many files (defaults to number of CPU cores)
# jobs = 4

[render]
# GitHub Flavored Markdown: tables, autolinks and strikethrough
gfm = true

# Turn every single newline inside a paragraph into a line break
hard_breaks = true

# Render $inline$ and $$display$$ math to MathML
math = true

# Replace :shortcode: emoji with the emoji itself
emoji = true

# Render "> [!NOTE]" style blockquotes as alerts
alerts = true

# Fill the section under a "Contents" / "Table of contents" / "TOC" heading
# with links to the headings that follow it
toc = true

# Keep raw HTML from the markdown source as elements. The sanitizer still
# removes everything the policy does not allow. When false, raw HTML is shown
# as text.
allow_embedded_markup = true

# Whether to enable syntax highlighting for code blocks
highlight_code = true

# Prefix of every generated heading id
heading_id_prefix = "h-"

# Shown in place of a document that could not be rendered
fallback_message = "An error occurred while rendering this content."

# Documents nesting deeper than this render the fallback message
max_nesting_depth = 128

# Highlighting theme used by `snowmark stylesheet`
# theme = "InspiredGitHub"

# Sanitizer allow-list. Leave this out to use the built-in policy. Any table
# given here replaces the matching built-in table; the others keep their
# built-in values. Run `snowmark policy` to see the built-in policy.
# [policy]
# tag_names = ["p", "a", "strong", "em", "h1", "h2", "h3", "code", "pre"]
# strip = ["script", "style", "iframe"]
#
# [policy.attributes]
# "*" = ["id", "class"]
# a = ["href", "title"]
#
# [policy.protocols]
# href = ["http", "https", "mailto"]
"#;

/// Default configuration template in JSON.
pub const DEFAULT_JSON_TEMPLATE: &str = r#"{
  "render": {
    "gfm": true,
    "hard_breaks": true,
    "math": true,
    "emoji": true,
    "alerts": true,
    "toc": true,
    "allow_embedded_markup": true,
    "highlight_code": true,
    "heading_id_prefix": "h-",
    "fallback_message": "An error occurred while rendering this content.",
    "max_nesting_depth": 128
  }
}
"#;

/// Get the correct configuration template based on the requested format.
///
/// # Errors
///
/// Returns an error if the requested format is not supported.
pub fn get_template(format: &str) -> Result<&'static str, TemplateError> {
  match format.to_lowercase().as_str() {
    "toml" => Ok(DEFAULT_TOML_TEMPLATE),
    "json" => Ok(DEFAULT_JSON_TEMPLATE),
    _ => Err(TemplateError::UnsupportedFormat(format.to_string())),
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;
  use crate::Config;

  #[test]
  fn test_templates_describe_the_defaults() {
    let from_toml: Config = toml::from_str(DEFAULT_TOML_TEMPLATE).unwrap();
    let from_json: Config = serde_json::from_str(DEFAULT_JSON_TEMPLATE).unwrap();
    assert_eq!(from_toml, Config::default());
    assert_eq!(from_json, Config::default());
  }

  #[test]
  fn test_unsupported_format() {
    assert!(get_template("TOML").is_ok());
    let err = get_template("yaml").unwrap_err();
    assert_eq!(err.to_string(), "Unsupported config format: yaml");
  }
}
