use thiserror::Error;

/// Errors originating from the core module.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// A frame with a zero dimension reached the renderer.
    #[error("Géométrie de frame invalide : {width}×{height}")]
    InvalidFrameGeometry {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Requested output width is zero.
    #[error("Largeur cible invalide : {0}")]
    InvalidTargetWidth(u32),

    /// Pixel buffer length does not match `width × height × channels`.
    #[error("Taille de buffer incohérente : attendu {expected} octets, reçu {actual}")]
    BufferSize {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        actual: usize,
    },
}
