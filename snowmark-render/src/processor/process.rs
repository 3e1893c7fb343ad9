//! Error recovery around the rendering pipeline.
use std::any::Any;

use log::error;

use crate::{
  error::{RenderError, StageResult},
  processor::types::MarkdownRenderer,
  types::{RenderResponse, RenderResult},
};

/// Run a render with error recovery.
///
/// Both an `Err` and a panic inside `render` produce the fallback result for
/// `fallback_message`. This is the only place pipeline failures are caught.
#[must_use]
pub fn render_with_recovery<F>(render: F, fallback_message: &str) -> RenderResult
where
  F: FnOnce() -> StageResult<RenderResult>,
{
  let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(render))
    .unwrap_or_else(|payload| Err(RenderError::Panic(panic_message(&*payload))));

  match outcome {
    Ok(result) => result,
    Err(e) => {
      error!("Markdown rendering failed, using fallback: {e}");
      RenderResult::fallback(fallback_message)
    },
  }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else if let Some(message) = payload.downcast_ref::<&str>() {
    (*message).to_string()
  } else {
    "unknown panic payload".to_string()
  }
}

/// Answer a render request the way the render service does.
///
/// `input` is the request's markdown, or the reason it could not be read.
/// Pipeline failures still count as success, carrying the fallback result.
pub fn render_response<E: std::fmt::Display>(
  renderer: &MarkdownRenderer,
  input: Result<String, E>,
) -> RenderResponse {
  match input {
    Ok(markdown) => RenderResponse::ok(renderer.render(&markdown)),
    Err(e) => RenderResponse::failed(e.to_string()),
  }
}
