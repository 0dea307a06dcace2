pub mod error;
pub mod grid;
/// Moteur de conversion frame → texte pour asciicam.
///
/// Quantifie la luminance dans une palette ordonnée et sérialise la grille
/// en bloc texte, avec ou sans couleur truecolor.
pub mod render;

pub use error::RenderError;
pub use grid::{AsciiCell, AsciiGrid};
pub use render::{FrameRenderer, target_height};
