#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Fine in tests")]
//! Batch rendering of files and directories.
use std::{fs, path::PathBuf};

use snowmark::render::{InputFile, collect_inputs, render_files};
use snowmark_render::{MarkdownRenderer, RenderOptions, RenderResponse};
use tempfile::TempDir;

fn renderer() -> MarkdownRenderer {
  MarkdownRenderer::new(RenderOptions::builder().highlight_code(false).build())
}

fn write(dir: &TempDir, relative: &str, content: &str) -> PathBuf {
  let path = dir.path().join(relative);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(&path, content).unwrap();
  path
}

#[test]
fn test_collect_inputs_walks_directories() {
  let dir = TempDir::new().expect("Failed to create temp dir");
  write(&dir, "b.md", "# B");
  write(&dir, "a.md", "# A");
  write(&dir, "nested/c.md", "# C");
  write(&dir, "notes.txt", "not markdown");

  let files = collect_inputs(&[dir.path().to_path_buf()]).unwrap();
  let relative: Vec<PathBuf> = files.into_iter().map(|f| f.relative).collect();
  assert_eq!(relative, [
    PathBuf::from("a.md"),
    PathBuf::from("b.md"),
    PathBuf::from("nested/c.md"),
  ]);
}

#[test]
fn test_collect_inputs_keeps_files_and_rejects_missing() {
  let dir = TempDir::new().expect("Failed to create temp dir");
  let file = write(&dir, "guide/page.md", "# Page");

  let files = collect_inputs(std::slice::from_ref(&file)).unwrap();
  assert_eq!(files, [InputFile {
    path:     file,
    relative: PathBuf::from("page.md"),
  }]);

  let missing = dir.path().join("missing.md");
  let err = collect_inputs(&[missing]).unwrap_err();
  assert!(err.to_string().contains("Input does not exist"));
}

#[test]
fn test_render_files_writes_envelopes() {
  let input = TempDir::new().expect("Failed to create temp dir");
  let output = TempDir::new().expect("Failed to create temp dir");
  write(&input, "index.md", "# Index\n\nSee <script>x()</script> *this*.");
  write(&input, "nested/deep.md", "## Deep\n\n## Deep");

  let files = collect_inputs(&[input.path().to_path_buf()]).unwrap();
  let responses =
    render_files(&renderer(), &files, Some(output.path()), false).unwrap();
  assert_eq!(responses.len(), 2);
  assert!(responses.iter().all(|r| r.success));

  let index: RenderResponse = serde_json::from_str(
    &fs::read_to_string(output.path().join("index.json")).unwrap(),
  )
  .unwrap();
  let data = index.data.unwrap();
  assert!(!data.html_content.contains("script"));
  assert_eq!(data.toc_items[0].id, "h-index");

  let deep: RenderResponse = serde_json::from_str(
    &fs::read_to_string(output.path().join("nested/deep.json")).unwrap(),
  )
  .unwrap();
  let ids: Vec<String> = deep
    .data
    .unwrap()
    .toc_items
    .into_iter()
    .map(|e| e.id)
    .collect();
  assert_eq!(ids, ["h-deep", "h-deep-1"]);
}

#[test]
fn test_unreadable_file_is_a_failed_envelope() {
  let dir = TempDir::new().expect("Failed to create temp dir");
  let path = dir.path().join("binary.md");
  fs::write(&path, [0xff, 0xfe, 0xfd]).unwrap();

  let files = collect_inputs(&[path]).unwrap();
  let responses = render_files(&renderer(), &files, None, false).unwrap();
  assert!(!responses[0].success);
  assert!(
    responses[0]
      .error
      .as_deref()
      .is_some_and(|e| e.contains("Failed to read"))
  );
}
