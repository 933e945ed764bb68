//! Error taxonomy for the viewport core.
//!
//! Degenerate geometry (zero or negative scale) is deliberately absent: it is a
//! valid design state and is rendered as-is.

use crate::scene::ObjectId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViewportError {
    /// A mutation referenced an id that is no longer in the store.
    #[error("object not found: {0}")]
    NotFound(ObjectId),
    /// A non-finite number reached the camera controller. The event is dropped.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// The host could not provide a render surface. Fatal to this viewport only.
    #[error("render context unavailable: {0}")]
    RenderContextUnavailable(String),
    /// A generated batch could not be decoded into object drafts.
    #[error("malformed object batch: {0}")]
    MalformedBatch(String),
}

impl ViewportError {
    /// Stable machine-readable code for hosts that surface errors.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_NOT_FOUND",
            Self::InvalidInput(_) => "E_INVALID_INPUT",
            Self::RenderContextUnavailable(_) => "E_RENDER_CONTEXT_UNAVAILABLE",
            Self::MalformedBatch(_) => "E_MALFORMED_BATCH",
        }
    }
}

/// Result alias used throughout the crate.
pub type ViewportResult<T> = Result<T, ViewportError>;
