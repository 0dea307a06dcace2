use ac_core::error::CoreError;
use ac_source::error::SourceError;
use thiserror::Error;

/// Errors returned by the frame renderer.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Invalid input: zero-sized frame or zero target width.
    #[error(transparent)]
    Input(#[from] CoreError),

    /// The resize or conversion collaborator failed.
    #[error(transparent)]
    Transform(#[from] SourceError),
}

impl RenderError {
    /// `true` when the frame itself had a zero dimension.
    #[must_use]
    pub fn is_invalid_geometry(&self) -> bool {
        matches!(self, Self::Input(CoreError::InvalidFrameGeometry { .. }))
    }
}
