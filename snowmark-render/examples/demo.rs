use std::fs;

use snowmark_render::{MarkdownRenderer, RenderOptions};

const DEMO_CONTENT: &str = include_str!("../demos/all-features.md");

fn main() -> Result<(), Box<dyn std::error::Error>> {
  println!("Testing Snowmark Renderer");
  println!("=========================\n");

  let renderer = MarkdownRenderer::new(RenderOptions::default());
  let result = renderer.render(DEMO_CONTENT);

  println!("Rendering completed!");
  println!("Results:");
  println!("  - Headings found: {}", result.toc_items.len());
  println!(
    "  - HTML output length: {} characters",
    result.html_content.len()
  );

  if !result.toc_items.is_empty() {
    println!("\nTable of contents:");
    for (i, entry) in result.toc_items.iter().enumerate() {
      println!(
        "  {}. {}{} -> #{}",
        i + 1,
        "  ".repeat(usize::from(entry.level.saturating_sub(1))),
        entry.text,
        entry.id
      );
    }
  }

  fs::create_dir_all("demos/output")?;
  fs::write("demos/output/all-features.html", &result.html_content)?;
  println!("\nHTML output saved to: demos/output/all-features.html");

  Ok(())
}
