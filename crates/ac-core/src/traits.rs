use crate::config::CaptureHints;
use crate::frame::Frame;

/// Périphérique de capture vidéo, possédé exclusivement par la boucle de capture.
///
/// L'ouverture est propre à chaque backend (constructeur `open`) ; une
/// instance de ce trait est donc toujours dans l'état « ouvert ».
///
/// Implémenté par : `FfmpegCamera`, `NokhwaCamera` (feature `webcam`).
///
/// # Example
/// ```
/// use ac_core::config::CaptureHints;
/// use ac_core::frame::{Frame, PixelLayout};
/// use ac_core::traits::CaptureDevice;
///
/// struct Still(Option<Frame>);
/// impl CaptureDevice for Still {
///     fn configure(&mut self, _hints: &CaptureHints) {}
///     fn read_frame(&mut self) -> Option<Frame> { self.0.take() }
///     fn release(&mut self) {}
/// }
///
/// let mut dev = Still(Some(Frame::filled(2, 2, PixelLayout::Rgb, 0)));
/// assert!(dev.read_frame().is_some());
/// assert!(dev.read_frame().is_none());
/// ```
pub trait CaptureDevice {
    /// Transmet résolution et FPS souhaités. Best-effort : un backend qui ne
    /// peut pas les appliquer les ignore (log::warn au plus), jamais d'erreur.
    fn configure(&mut self, hints: &CaptureHints);

    /// Bloque jusqu'à la prochaine frame.
    ///
    /// Retourne `None` en fin de flux ou si le périphérique a disparu.
    fn read_frame(&mut self) -> Option<Frame>;

    /// Libère le périphérique. Doit être idempotent : la boucle l'appelle
    /// explicitement puis à nouveau via son garde `Drop`.
    fn release(&mut self);
}

/// Terminal cible du texte rendu.
pub trait Terminal {
    /// Efface l'écran et replace le curseur en haut à gauche.
    ///
    /// # Errors
    /// Returns the underlying I/O error.
    fn clear(&mut self) -> std::io::Result<()>;

    /// Écrit un bloc de texte et flush.
    ///
    /// # Errors
    /// Returns the underlying I/O error.
    fn write_text(&mut self, text: &str) -> std::io::Result<()>;

    /// Restaure l'état du terminal (curseur, couleurs). Idempotent.
    fn release(&mut self);
}
