//! Provides a trait-based architecture for syntax highlighting that allows
//! multiple backends to be plugged in.
//! Currently supported backends:
//! - **Syntect** - Uses Sublime Text syntax definitions, with two-face added
//!   for extended syntax definitions and themes

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{SyntaxError, SyntaxResult};
pub use types::{CLASS_PREFIX, SyntaxConfig, SyntaxHighlighter, SyntaxManager};

// Syntect backend implementation
#[cfg(feature = "syntect")] mod syntect;
#[cfg(feature = "syntect")] pub use syntect::*;

/// Create the default syntax manager based on available features.
///
/// **Note**: While the `syntect` feature is enabled, the two-face crate
/// will also be pulled to provide additional Syntax highlighting.
///
/// # Errors
///
/// Returns [`SyntaxError::NoBackendAvailable`] when the crate was built
/// without a highlighting backend.
pub fn create_default_manager() -> SyntaxResult<SyntaxManager> {
  #[cfg(feature = "syntect")]
  {
    Ok(create_syntect_manager())
  }

  #[cfg(not(feature = "syntect"))]
  {
    Err(SyntaxError::NoBackendAvailable)
  }
}
