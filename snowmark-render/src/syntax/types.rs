//! Core types and traits for syntax highlighting.

use std::collections::HashMap;

use super::error::{SyntaxError, SyntaxResult};

/// CSS class prefix of highlighted tokens.
pub const CLASS_PREFIX: &str = "hl-";

/// Trait for syntax highlighting backends.
///
/// Backends emit class-annotated `<span>` tokens; colors come from
/// [`SyntaxHighlighter::stylesheet`].
pub trait SyntaxHighlighter: Send + Sync {
  /// Get the name of this highlighter backend
  fn name(&self) -> &'static str;

  /// Get a list of supported languages
  fn supported_languages(&self) -> Vec<String>;

  /// Get a list of available themes
  fn available_themes(&self) -> Vec<String>;

  /// Check if a language is supported
  fn supports_language(&self, language: &str) -> bool {
    self
      .supported_languages()
      .iter()
      .any(|lang| lang.eq_ignore_ascii_case(language))
  }

  /// Check if a theme is available
  fn has_theme(&self, theme: &str) -> bool {
    self
      .available_themes()
      .iter()
      .any(|t| t.eq_ignore_ascii_case(theme))
  }

  /// Highlight code in the given language.
  ///
  /// # Arguments
  ///
  /// * `code` - The source code to highlight
  /// * `language` - The programming language (case-insensitive)
  ///
  /// # Returns
  ///
  /// Token spans as an HTML fragment, without the surrounding `pre`/`code`.
  fn highlight(&self, code: &str, language: &str) -> SyntaxResult<String>;

  /// CSS rules coloring the token classes for a theme.
  fn stylesheet(&self, theme: &str) -> SyntaxResult<String>;
}

/// Configuration for syntax highlighting
#[derive(Debug, Clone)]
pub struct SyntaxConfig {
  /// Theme used for the stylesheet when none is requested
  pub default_theme: String,

  /// Language aliases for mapping common names to supported languages
  pub language_aliases: HashMap<String, String>,

  /// Whether to highlight unsupported languages as plain text
  pub fallback_to_plain: bool,
}

impl Default for SyntaxConfig {
  fn default() -> Self {
    let mut language_aliases = HashMap::new();

    // Common aliases
    language_aliases.insert("js".to_string(), "javascript".to_string());
    language_aliases.insert("jsx".to_string(), "javascript".to_string());
    language_aliases.insert("ts".to_string(), "typescript".to_string());
    language_aliases.insert("py".to_string(), "python".to_string());
    language_aliases.insert("rb".to_string(), "ruby".to_string());
    language_aliases.insert("sh".to_string(), "bash".to_string());
    language_aliases.insert("shell".to_string(), "bash".to_string());
    language_aliases.insert("zsh".to_string(), "bash".to_string());
    language_aliases.insert("yml".to_string(), "yaml".to_string());
    language_aliases.insert("md".to_string(), "markdown".to_string());
    language_aliases.insert("rs".to_string(), "rust".to_string());

    Self {
      default_theme: "InspiredGitHub".to_string(),
      language_aliases,
      fallback_to_plain: false,
    }
  }
}

/// High-level syntax highlighting manager.
///
/// Manages a syntax highlighting backend and provides a convenient
/// interface for highlighting code with configuration options.
pub struct SyntaxManager {
  highlighter: Box<dyn SyntaxHighlighter>,
  config:      SyntaxConfig,
}

impl std::fmt::Debug for SyntaxManager {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SyntaxManager")
      .field("highlighter", &self.highlighter.name())
      .field("config", &self.config)
      .finish()
  }
}

impl SyntaxManager {
  /// Create a new syntax manager with the given highlighter and config
  #[must_use]
  pub fn new(
    highlighter: Box<dyn SyntaxHighlighter>,
    config: SyntaxConfig,
  ) -> Self {
    Self {
      highlighter,
      config,
    }
  }

  /// Create a new syntax manager with the default configuration
  #[must_use]
  pub fn with_highlighter(highlighter: Box<dyn SyntaxHighlighter>) -> Self {
    Self::new(highlighter, SyntaxConfig::default())
  }

  /// Get the underlying highlighter
  #[must_use]
  pub fn highlighter(&self) -> &dyn SyntaxHighlighter {
    self.highlighter.as_ref()
  }

  /// Get the configuration
  #[must_use]
  pub const fn config(&self) -> &SyntaxConfig {
    &self.config
  }

  /// Update the configuration
  pub fn set_config(&mut self, config: SyntaxConfig) {
    self.config = config;
  }

  /// Resolve a language name using aliases
  #[must_use]
  pub fn resolve_language(&self, language: &str) -> String {
    let language = language.to_ascii_lowercase();
    self
      .config
      .language_aliases
      .get(&language)
      .cloned()
      .unwrap_or(language)
  }

  /// Whether [`SyntaxManager::highlight_code`] would accept the language.
  #[must_use]
  pub fn supports(&self, language: &str) -> bool {
    self.config.fallback_to_plain
      || self
        .highlighter
        .supports_language(&self.resolve_language(language))
  }

  /// Highlight code with automatic language resolution and fallback
  ///
  /// # Errors
  ///
  /// Returns [`SyntaxError::UnsupportedLanguage`] when the language is unknown
  /// and plain-text fallback is disabled, or the backend's error.
  pub fn highlight_code(
    &self,
    code: &str,
    language: &str,
  ) -> SyntaxResult<String> {
    let resolved_language = self.resolve_language(language);

    // Try to highlight with the resolved language
    if self.highlighter.supports_language(&resolved_language) {
      return self.highlighter.highlight(code, &resolved_language);
    }

    // If language is not supported and fallback is enabled, try plain text
    if self.config.fallback_to_plain {
      if self.highlighter.supports_language("text") {
        return self.highlighter.highlight(code, "text");
      }
      if self.highlighter.supports_language("plain") {
        return self.highlighter.highlight(code, "plain");
      }
    }

    Err(SyntaxError::UnsupportedLanguage(resolved_language))
  }

  /// Stylesheet for `theme`, or for the configured default theme.
  ///
  /// # Errors
  ///
  /// Returns [`SyntaxError::ThemeNotFound`] for an unknown theme.
  pub fn stylesheet(&self, theme: Option<&str>) -> SyntaxResult<String> {
    let theme = theme.unwrap_or(&self.config.default_theme);
    if !self.highlighter.has_theme(theme) {
      return Err(SyntaxError::ThemeNotFound(theme.to_string()));
    }
    self.highlighter.stylesheet(theme)
  }
}
