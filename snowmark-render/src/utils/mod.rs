//! Small helpers shared by the pipeline stages.

/// Slugify heading text for use in an element id.
///
/// Lowercases the text, collapses every run of characters that are not
/// alphanumeric into a single dash and trims dashes at both ends. Returns
/// `section` when nothing is left, so that every heading gets a usable id.
#[must_use]
pub fn slugify(text: &str) -> String {
  let mut slug = String::with_capacity(text.len());
  let mut pending_dash = false;

  for c in text.chars().flat_map(char::to_lowercase) {
    if c.is_alphanumeric() {
      if pending_dash && !slug.is_empty() {
        slug.push('-');
      }
      pending_dash = false;
      slug.push(c);
    } else {
      pending_dash = true;
    }
  }

  if slug.is_empty() {
    "section".to_string()
  } else {
    slug
  }
}

/// Create a regex that never matches anything.
///
/// This is used as a fallback pattern when a regex fails to compile.
/// It will never match any input, which is safer than using a trivial regex
/// like `^$` which would match empty strings.
#[must_use]
pub fn never_matching_regex() -> regex::Regex {
  // A character class that excludes everything.
  regex::Regex::new(r"[^\s\S]").unwrap_or_else(|_| {
    #[allow(clippy::unwrap_used, reason = "Literal pattern is always valid")]
    regex::Regex::new(r"^\b$").unwrap()
  })
}
