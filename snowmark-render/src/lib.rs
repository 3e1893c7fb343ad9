//! # snowmark-render
//!
//! Markdown to sanitized HTML, with stable heading ids and a table of
//! contents.
//!
//! ## Quick Start
//!
//! ```rust
//! use snowmark_render::{MarkdownRenderer, RenderOptions};
//!
//! let renderer = MarkdownRenderer::new(RenderOptions::default());
//! let result = renderer.render("# Hello World\n\nThis is **bold** text.");
//!
//! assert!(result.html_content.contains("<h1 id=\"h-hello-world\">"));
//! assert_eq!(result.toc_items[0].text, "Hello World");
//! ```
//!
//! ## Features
//!
//! - **CommonMark and GFM** parsing via `comrak`
//! - **Math** (`$inline$`, `$$display$$`) rendered to `MathML`
//! - **Emoji shortcodes** and **GitHub alerts**
//! - **Syntax highlighting** with class-based `syntect` output
//! - **Allow-list sanitization** of the final markup, configurable per
//!   renderer
//! - **Error recovery**: rendering never fails, a fixed fallback is returned
//!   instead
//!
//! ## Configuration
//!
//! ```rust
//! use snowmark_render::{AllowListPolicy, MarkdownRenderer, RenderOptions};
//!
//! let options = RenderOptions::builder()
//!   .hard_breaks(false)
//!   .allow_embedded_markup(false)
//!   .build();
//!
//! let renderer =
//!   MarkdownRenderer::new(options).with_policy(AllowListPolicy::text_only());
//! let result = renderer.render("<b>raw</b>");
//! assert_eq!(result.html_content, "&lt;b&gt;raw&lt;/b&gt;");
//! ```

pub mod ast;
pub mod error;
pub mod extensions;
pub mod headings;
pub mod lower;
pub mod markup;
pub mod parser;
pub mod processor;
pub mod render;
pub mod sanitize;
pub mod syntax;
pub mod types;
pub mod utils;

pub use crate::{
  error::{RenderError, StageResult},
  extensions::{ExtensionSet, SyntaxExtension},
  processor::{
    MarkdownRenderer,
    RenderOptions,
    RenderOptionsBuilder,
    render_response,
    render_with_recovery,
  },
  render::MathRenderer,
  sanitize::AllowListPolicy,
  types::{RenderResponse, RenderResult, TocEntry},
};
