//! Rendering error types.

use crate::core::markup::ConvertError;

/// Faults inside a render path. Never surfaced to callers of
/// [`Renderer::render`](super::Renderer::render); they trigger the plain-text fallback.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error("JSON formatting failed: {0}")]
    Json(#[from] serde_json::Error),
}
