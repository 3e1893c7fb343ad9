//! Batch rendering of markdown inputs to the JSON response envelope.
use std::{
  fs,
  io::{self, Read},
  path::{Path, PathBuf},
};

use color_eyre::eyre::{Context, Result};
use log::{debug, info};
use rayon::prelude::*;
use snowmark_render::{MarkdownRenderer, RenderResponse, render_response};
use walkdir::WalkDir;

/// A markdown file to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
  /// Where to read the markdown from.
  pub path:     PathBuf,
  /// Path relative to the directory it was found in, or the bare file name
  /// for files given directly. Output files mirror this path.
  pub relative: PathBuf,
}

impl InputFile {
  /// Path of the JSON output for this input inside `output_dir`.
  #[must_use]
  pub fn output_path(&self, output_dir: &Path) -> PathBuf {
    output_dir.join(&self.relative).with_extension("json")
  }
}

/// Whether the inputs mean "read from stdin".
#[must_use]
pub fn is_stdin(inputs: &[PathBuf]) -> bool {
  inputs.is_empty() || (inputs.len() == 1 && inputs[0] == Path::new("-"))
}

/// Expand files and directories into the list of markdown files to render.
///
/// Directories are walked recursively for `.md` files, in file name order.
///
/// # Errors
///
/// Returns an error if an input does not exist.
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<InputFile>> {
  let mut files = Vec::new();
  for input in inputs {
    if input.is_dir() {
      let entries = WalkDir::new(input)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| {
          e.path().is_file()
            && e.path().extension().is_some_and(|ext| ext == "md")
        });
      for entry in entries {
        let path = entry.path().to_path_buf();
        let relative =
          path.strip_prefix(input).unwrap_or(path.as_path()).to_path_buf();
        files.push(InputFile { path, relative });
      }
    } else if input.is_file() {
      let relative = input
        .file_name()
        .map_or_else(|| input.clone(), PathBuf::from);
      files.push(InputFile {
        path: input.clone(),
        relative,
      });
    } else {
      color_eyre::eyre::bail!("Input does not exist: {}", input.display());
    }
  }
  Ok(files)
}

/// Serialize a response envelope.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(response: &RenderResponse, pretty: bool) -> Result<String> {
  let json = if pretty {
    serde_json::to_string_pretty(response)
  } else {
    serde_json::to_string(response)
  };
  json.wrap_err("Failed to serialize render response")
}

/// Render markdown read from `reader`.
#[must_use]
pub fn render_reader(
  renderer: &MarkdownRenderer,
  mut reader: impl Read,
) -> RenderResponse {
  let mut markdown = String::new();
  let input = reader.read_to_string(&mut markdown).map(|_| markdown);
  render_response(renderer, input)
}

/// Render markdown from stdin.
#[must_use]
pub fn render_stdin(renderer: &MarkdownRenderer) -> RenderResponse {
  render_reader(renderer, io::stdin().lock())
}

/// Render one file. Unreadable files yield a failed envelope.
#[must_use]
pub fn render_file(renderer: &MarkdownRenderer, path: &Path) -> RenderResponse {
  debug!("Rendering {}", path.display());
  let input = fs::read_to_string(path)
    .map_err(|e| format!("Failed to read {}: {e}", path.display()));
  render_response(renderer, input)
}

/// Render files in parallel, keeping input order in the result.
///
/// With an `output_dir`, each response is also written to
/// [`InputFile::output_path`].
///
/// # Errors
///
/// Returns an error if an output file cannot be written.
pub fn render_files(
  renderer: &MarkdownRenderer,
  files: &[InputFile],
  output_dir: Option<&Path>,
  pretty: bool,
) -> Result<Vec<RenderResponse>> {
  info!("Rendering {} markdown files", files.len());

  files
    .par_iter()
    .map(|file| {
      let response = render_file(renderer, &file.path);
      if let Some(output_dir) = output_dir {
        let output_path = file.output_path(output_dir);
        if let Some(parent) = output_path.parent() {
          fs::create_dir_all(parent).wrap_err_with(|| {
            format!("Failed to create directory: {}", parent.display())
          })?;
        }
        fs::write(&output_path, to_json(&response, pretty)?).wrap_err_with(
          || format!("Failed to write {}", output_path.display()),
        )?;
      }
      Ok(response)
    })
    .collect()
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use snowmark_render::RenderOptions;

  use super::*;

  fn renderer() -> MarkdownRenderer {
    MarkdownRenderer::new(RenderOptions::builder().highlight_code(false).build())
  }

  #[test]
  fn test_is_stdin() {
    assert!(is_stdin(&[]));
    assert!(is_stdin(&[PathBuf::from("-")]));
    assert!(!is_stdin(&[PathBuf::from("a.md")]));
    assert!(!is_stdin(&[PathBuf::from("-"), PathBuf::from("a.md")]));
  }

  #[test]
  fn test_output_path_mirrors_relative_path() {
    let file = InputFile {
      path:     PathBuf::from("docs/guide/intro.md"),
      relative: PathBuf::from("guide/intro.md"),
    };
    assert_eq!(
      file.output_path(Path::new("out")),
      PathBuf::from("out/guide/intro.json")
    );
  }

  #[test]
  fn test_render_reader() {
    let response = render_reader(&renderer(), "# Hi".as_bytes());
    assert!(response.success);
    assert_eq!(response.data.unwrap().toc_items[0].id, "h-hi");
  }

  #[test]
  fn test_render_reader_invalid_utf8() {
    let response = render_reader(&renderer(), &[0xff, 0xfe][..]);
    assert!(!response.success);
    assert!(response.data.is_none());
    assert!(response.error.is_some());
  }

  #[test]
  fn test_json_envelope_field_names() {
    let response = render_reader(&renderer(), "# Hi".as_bytes());
    let json = to_json(&response, false).unwrap();
    assert_eq!(
      json,
      r#"{"success":true,"data":{"htmlContent":"<h1 id=\"h-hi\">Hi</h1>","tocItems":[{"level":1,"text":"Hi","id":"h-hi"}]}}"#
    );
  }
}
