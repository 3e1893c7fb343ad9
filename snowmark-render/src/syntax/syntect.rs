//! Syntect-based syntax highlighting backend enhanced with two-face.
//!
//! This module provides a syntax highlighter using the Syntect library,
//! which uses Sublime Text's syntax definitions (TextMate grammars),
//! significantly enhanced with the two-face crate for extended
//! syntax definitions and themes.

use std::sync::OnceLock;

use syntect::{
  highlighting::Theme,
  html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style},
  parsing::SyntaxSet,
  util::LinesWithEndings,
};
use two_face::{
  re_exports::syntect::highlighting::ThemeSet,
  theme::{EmbeddedLazyThemeSet, EmbeddedThemeName},
};

use super::{
  error::{SyntaxError, SyntaxResult},
  types::{CLASS_PREFIX, SyntaxConfig, SyntaxHighlighter, SyntaxManager},
};

/// Themes shipped by two-face, by the name users pick them with.
const EMBEDDED_THEMES: &[(&str, EmbeddedThemeName)] = &[
  ("Ansi", EmbeddedThemeName::Ansi),
  ("Base16", EmbeddedThemeName::Base16),
  ("Base16EightiesDark", EmbeddedThemeName::Base16EightiesDark),
  ("Base16MochaDark", EmbeddedThemeName::Base16MochaDark),
  ("Base16OceanDark", EmbeddedThemeName::Base16OceanDark),
  ("Base16OceanLight", EmbeddedThemeName::Base16OceanLight),
  ("Base16_256", EmbeddedThemeName::Base16_256),
  ("CatppuccinFrappe", EmbeddedThemeName::CatppuccinFrappe),
  ("CatppuccinLatte", EmbeddedThemeName::CatppuccinLatte),
  ("CatppuccinMacchiato", EmbeddedThemeName::CatppuccinMacchiato),
  ("CatppuccinMocha", EmbeddedThemeName::CatppuccinMocha),
  ("ColdarkCold", EmbeddedThemeName::ColdarkCold),
  ("ColdarkDark", EmbeddedThemeName::ColdarkDark),
  ("DarkNeon", EmbeddedThemeName::DarkNeon),
  ("Dracula", EmbeddedThemeName::Dracula),
  ("Github", EmbeddedThemeName::Github),
  ("GruvboxDark", EmbeddedThemeName::GruvboxDark),
  ("GruvboxLight", EmbeddedThemeName::GruvboxLight),
  ("InspiredGithub", EmbeddedThemeName::InspiredGithub),
  ("Leet", EmbeddedThemeName::Leet),
  ("MonokaiExtended", EmbeddedThemeName::MonokaiExtended),
  ("MonokaiExtendedBright", EmbeddedThemeName::MonokaiExtendedBright),
  ("MonokaiExtendedLight", EmbeddedThemeName::MonokaiExtendedLight),
  ("MonokaiExtendedOrigin", EmbeddedThemeName::MonokaiExtendedOrigin),
  ("Nord", EmbeddedThemeName::Nord),
  ("OneHalfDark", EmbeddedThemeName::OneHalfDark),
  ("OneHalfLight", EmbeddedThemeName::OneHalfLight),
  ("SolarizedDark", EmbeddedThemeName::SolarizedDark),
  ("SolarizedLight", EmbeddedThemeName::SolarizedLight),
  ("SublimeSnazzy", EmbeddedThemeName::SublimeSnazzy),
  ("TwoDark", EmbeddedThemeName::TwoDark),
  ("Zenburn", EmbeddedThemeName::Zenburn),
];

/// Syntect-based syntax highlighter
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntectHighlighter;

impl SyntectHighlighter {
  /// Get the syntect SyntaxSet.
  fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(two_face::syntax::extra_newlines)
  }

  /// Get the syntect ThemeSet with extended themes.
  fn theme_set() -> &'static EmbeddedLazyThemeSet {
    static THEME_SET: OnceLock<EmbeddedLazyThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(two_face::theme::extra)
  }

  /// Get the default syntect ThemeSet.
  fn default_theme_set() -> &'static ThemeSet {
    static DEFAULT_THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    DEFAULT_THEME_SET.get_or_init(ThemeSet::load_defaults)
  }

  /// Look a theme up by name, case-insensitively.
  fn find_theme(name: &str) -> Option<&'static Theme> {
    let default_theme_set = Self::default_theme_set();
    if let Some(theme) = default_theme_set
      .themes
      .iter()
      .find(|(key, _)| key.eq_ignore_ascii_case(name))
      .map(|(_, theme)| theme)
    {
      return Some(theme);
    }

    EMBEDDED_THEMES
      .iter()
      .find(|(key, _)| key.eq_ignore_ascii_case(name))
      .map(|(_, embedded)| Self::theme_set().get(*embedded))
  }
}

impl SyntaxHighlighter for SyntectHighlighter {
  fn name(&self) -> &'static str {
    "Syntect"
  }

  fn supported_languages(&self) -> Vec<String> {
    Self::syntax_set()
      .syntaxes()
      .iter()
      .flat_map(|syntax| {
        std::iter::once(syntax.name.to_lowercase())
          .chain(syntax.file_extensions.iter().map(|ext| ext.to_lowercase()))
      })
      .collect()
  }

  fn supports_language(&self, language: &str) -> bool {
    Self::syntax_set().find_syntax_by_token(language).is_some()
  }

  fn available_themes(&self) -> Vec<String> {
    let mut themes: Vec<String> =
      Self::default_theme_set().themes.keys().cloned().collect();
    themes.extend(EMBEDDED_THEMES.iter().map(|(name, _)| (*name).to_string()));
    themes.sort();
    themes.dedup();
    themes
  }

  fn highlight(&self, code: &str, language: &str) -> SyntaxResult<String> {
    let syntax_set = Self::syntax_set();
    let syntax = syntax_set
      .find_syntax_by_token(language)
      .ok_or_else(|| SyntaxError::UnsupportedLanguage(language.to_string()))?;

    let mut generator = ClassedHTMLGenerator::new_with_class_style(
      syntax,
      syntax_set,
      ClassStyle::SpacedPrefixed {
        prefix: CLASS_PREFIX,
      },
    );
    for line in LinesWithEndings::from(code) {
      generator
        .parse_html_for_line_which_includes_newline(line)
        .map_err(|e| SyntaxError::HighlightingFailed(e.to_string()))?;
    }
    Ok(generator.finalize())
  }

  fn stylesheet(&self, theme: &str) -> SyntaxResult<String> {
    let theme = Self::find_theme(theme)
      .ok_or_else(|| SyntaxError::ThemeNotFound(theme.to_string()))?;
    css_for_theme_with_class_style(theme, ClassStyle::SpacedPrefixed {
      prefix: CLASS_PREFIX,
    })
    .map_err(|e| SyntaxError::HighlightingFailed(e.to_string()))
  }
}

/// Create a Syntect-based syntax manager with configuration
#[must_use]
pub fn create_syntect_manager() -> SyntaxManager {
  SyntaxManager::new(Box::new(SyntectHighlighter), SyntaxConfig::default())
}
