//! Types for the snowmark-render public API.
use serde::{Deserialize, Serialize};

/// A table of contents entry for one heading of the rendered document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TocEntry {
  /// Heading level (1-6).
  pub level: u8,
  /// Plain text of the heading, tags stripped and trimmed.
  pub text:  String,
  /// The `id` attribute assigned to the heading element.
  pub id:    String,
}

/// Result of rendering one markdown document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RenderResult {
  /// Sanitized HTML, safe to inject into a DOM.
  pub html_content: String,

  /// Headings in document order.
  pub toc_items: Vec<TocEntry>,
}

impl RenderResult {
  /// The fixed result returned when any pipeline stage fails.
  ///
  /// The message is escaped and wrapped in a single paragraph.
  #[must_use]
  pub fn fallback(message: &str) -> Self {
    Self {
      html_content: format!("<p>{}</p>", html_escape::encode_text(message)),
      toc_items:    Vec::new(),
    }
  }
}

/// Response envelope of the render service boundary.
///
/// A pipeline failure is still `success: true`; the data then holds the
/// fallback result. `success: false` is reserved for failures outside the
/// pipeline, such as unreadable input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderResponse {
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data:    Option<RenderResult>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error:   Option<String>,
}

impl RenderResponse {
  #[must_use]
  pub const fn ok(data: RenderResult) -> Self {
    Self {
      success: true,
      data:    Some(data),
      error:   None,
    }
  }

  #[must_use]
  pub fn failed(error: impl Into<String>) -> Self {
    Self {
      success: false,
      data:    None,
      error:   Some(error.into()),
    }
  }
}
