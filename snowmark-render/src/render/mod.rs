//! Rendering of math and fenced code inside the markup tree.
//!
//! Both renderers degrade per node: a node that cannot be rendered keeps its
//! source as plain text and the rest of the document carries on.

pub mod code;
pub mod math;

pub use code::render_code;
pub use math::{LatexMathRenderer, MathRenderer, render_math};
