/// Sources visuelles d'asciicam : capture caméra et transformations d'image.

pub mod error;
pub mod ffmpeg;
pub mod transform;

#[cfg(feature = "webcam")]
pub mod webcam;

pub use error::SourceError;
