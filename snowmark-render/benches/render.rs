#![allow(clippy::unwrap_used, reason = "Fine in benchmarks")]
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use snowmark_render::{MarkdownRenderer, RenderOptions};

const MARKDOWN_SMALL: &str = r"# Welcome

This is a test paragraph with **bold** and *italic* text. You can read this.
";

const MARKDOWN_LARGE: &str = r#"# Getting Started

If you can read this, chances are you can also render it properly :smile:

## Prerequisites

- Computer
- Basic knowledge of command line
- Text editor

## Installation

```rust
fn main() {
    let renderer = MarkdownRenderer::default();
    println!("{}", renderer.render("# Hi").html_content);
}
```

> [!TIP]
> Inline math such as $e^{i\pi} + 1 = 0$ is rendered to MathML.

$$
\sum_{k=1}^{n} k = \frac{n(n+1)}{2}
$$

| Option     | Default | Description            |
|:-----------|:-------:|-----------------------:|
| `gfm`      | true    | Tables and autolinks   |
| `math`     | true    | Dollar-delimited math  |
| `emoji`    | true    | Shortcodes like :tada: |

<details><summary>Raw HTML</summary>
<p onclick="steal()">Handlers are removed, <a href="javascript:x()">links</a> too.</p>
</details>

## Installation

Duplicate headings get distinct ids. See https://example.com for more.
"#;

fn bench_render(c: &mut Criterion) {
  let mut group = c.benchmark_group("render");

  let plain = MarkdownRenderer::new(
    RenderOptions::builder().highlight_code(false).build(),
  );
  let highlighted =
    MarkdownRenderer::new(RenderOptions::builder().highlight_code(true).build());

  for (size, markdown) in [("small", MARKDOWN_SMALL), ("large", MARKDOWN_LARGE)]
  {
    group.bench_with_input(
      BenchmarkId::new("plain", size),
      &markdown,
      |b, markdown| {
        b.iter(|| plain.render(black_box(markdown)));
      },
    );

    group.bench_with_input(
      BenchmarkId::new("highlighted", size),
      &markdown,
      |b, markdown| {
        b.iter(|| highlighted.render(black_box(markdown)));
      },
    );
  }

  group.finish();
}

fn bench_try_render(c: &mut Criterion) {
  let renderer = MarkdownRenderer::new(
    RenderOptions::builder().highlight_code(false).build(),
  );
  c.bench_function("try_render_large", |b| {
    b.iter(|| renderer.try_render(black_box(MARKDOWN_LARGE)).unwrap());
  });
}

criterion_group!(benches, bench_render, bench_try_render);
criterion_main!(benches);
