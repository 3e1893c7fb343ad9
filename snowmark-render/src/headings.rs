//! Heading ids and table of contents extraction.

use std::collections::{HashMap, HashSet};

use crate::{markup::MarkupTree, types::TocEntry, utils::slugify};

/// Generates unique slugs the way GitHub does: the first occurrence keeps the
/// bare slug, later ones get `-1`, `-2`, and so on.
#[derive(Debug, Default)]
pub struct Slugger {
  occurrences: HashMap<String, usize>,
}

impl Slugger {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Unique slug for `text`.
  pub fn slug(&mut self, text: &str) -> String {
    let original = slugify(text);
    let mut slug = original.clone();

    while self.occurrences.contains_key(&slug) {
      let count = self.occurrences.entry(original.clone()).or_insert(0);
      *count += 1;
      slug = format!("{original}-{count}");
    }

    self.occurrences.insert(slug.clone(), 0);
    slug
  }
}

/// Give every `h1`..`h6` element an id of `prefix` + unique slug of its text.
///
/// Existing ids are overwritten. The result depends only on the headings'
/// text and order, so rendering the same document twice yields the same ids.
pub fn assign_ids(tree: &mut MarkupTree, prefix: &str) {
  let mut slugger = Slugger::new();
  tree.for_each_element_mut(&mut |element| {
    if element.heading_level().is_none() {
      return;
    }
    let slug = slugger.slug(element.text_content().trim());
    element.attrs.insert("id".to_string(), format!("{prefix}{slug}"));
  });
}

/// Collect one entry per heading that has an id and non-empty text, in
/// document order.
#[must_use]
pub fn extract_toc(tree: &MarkupTree) -> Vec<TocEntry> {
  let mut entries = Vec::new();
  tree.for_each_element(&mut |element| {
    let Some(level) = element.heading_level() else {
      return;
    };
    let Some(id) = element.attr("id").filter(|id| !id.is_empty()) else {
      return;
    };
    let text = element.text_content().trim().to_string();
    if text.is_empty() {
      return;
    }
    entries.push(TocEntry {
      level,
      text,
      id: id.to_string(),
    });
  });
  entries
}

/// Drop entries whose heading id no longer exists in the tree.
pub fn retain_present(entries: &mut Vec<TocEntry>, tree: &MarkupTree) {
  let mut present = HashSet::new();
  tree.for_each_element(&mut |element| {
    if element.heading_level().is_some() {
      if let Some(id) = element.attr("id") {
        present.insert(id.to_string());
      }
    }
  });
  entries.retain(|entry| present.contains(&entry.id));
}
