/// Types partagés d'asciicam : frames, palette, configuration, traits.
///
/// This crate has no knowledge of cameras or terminals beyond the
/// [`traits::CaptureDevice`] and [`traits::Terminal`] seams.

pub mod cancel;
pub mod charset;
pub mod config;
pub mod error;
pub mod frame;
pub mod traits;

pub use cancel::CancelToken;
pub use charset::Palette;
pub use config::{AppConfig, CaptureHints, RenderMode};
pub use error::CoreError;
pub use frame::{Frame, PixelLayout};
