use thiserror::Error;

/// Errors originating from capture backends and frame transforms.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The capture device could not be acquired.
    #[error("Périphérique de capture {index} indisponible : {reason}")]
    DeviceUnavailable {
        /// Requested device index.
        index: u32,
        /// Backend-specific reason.
        reason: String,
    },

    /// `ffmpeg` is not on PATH.
    #[error("ffmpeg introuvable. Installez-le et vérifiez qu'il est dans le PATH.")]
    FfmpegNotFound,

    /// I/O failure while talking to the backend.
    #[error("Erreur I/O : {0}")]
    Io(#[from] std::io::Error),

    /// Resize or conversion failure reported by the image library.
    #[error("Transformation d'image impossible : {0}")]
    Transform(String),
}
