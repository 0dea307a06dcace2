use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Output width of the monochrome variant, in characters.
pub const MONO_WIDTH: u32 = 120;

/// Output width of the colored variant, in characters.
pub const COLOR_WIDTH: u32 = 100;

/// Délai fixe entre deux frames. Non compensé par le temps de rendu.
pub const DEFAULT_FRAME_DELAY_MS: u64 = 100;

/// Variante de rendu.
///
/// # Example
/// ```
/// use ac_core::config::RenderMode;
/// assert_eq!(RenderMode::Mono.width(), 120);
/// assert_eq!(RenderMode::Color.width(), 100);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum RenderMode {
    /// Glyphes seuls.
    #[default]
    Mono,
    /// Glyphe + séquence truecolor par cellule.
    Color,
}

impl RenderMode {
    /// Fixed output width for this variant.
    #[must_use]
    pub fn width(self) -> u32 {
        match self {
            Self::Mono => MONO_WIDTH,
            Self::Color => COLOR_WIDTH,
        }
    }

    /// Human-readable label for logs and the prompt.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Mono => "ASCII noir et blanc",
            Self::Color => "ASCII couleur",
        }
    }

    /// Interpret the interactive prompt answer: `"2"` → colored, anything
    /// else → monochrome.
    ///
    /// # Example
    /// ```
    /// use ac_core::config::RenderMode;
    /// assert_eq!(RenderMode::from_choice(" 2\n"), RenderMode::Color);
    /// assert_eq!(RenderMode::from_choice("1"), RenderMode::Mono);
    /// assert_eq!(RenderMode::from_choice("banana"), RenderMode::Mono);
    /// ```
    #[must_use]
    pub fn from_choice(answer: &str) -> Self {
        if answer.trim() == "2" {
            Self::Color
        } else {
            Self::Mono
        }
    }
}

/// Résolution et FPS demandés au périphérique. Indicatifs : le
/// périphérique peut les ignorer sans que ce soit une erreur.
///
/// # Example
/// ```
/// use ac_core::config::CaptureHints;
/// let hints = CaptureHints::default();
/// assert_eq!((hints.width, hints.height, hints.fps), (640, 480, 30));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct CaptureHints {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for CaptureHints {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 30,
        }
    }
}

/// Configuration côté capture. Le rendu n'est pas configurable au-delà du
/// choix de variante ; la largeur découle de [`RenderMode`].
///
/// # Example
/// ```
/// use ac_core::config::AppConfig;
/// let config = AppConfig::default();
/// assert_eq!(config.device, 0);
/// assert_eq!(config.frame_delay().as_millis(), 100);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppConfig {
    /// Index du périphérique de capture.
    pub device: u32,
    /// Hints transmis au périphérique à l'ouverture.
    pub hints: CaptureHints,
    /// Pause entre deux itérations, en millisecondes.
    pub frame_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            device: 0,
            hints: CaptureHints::default(),
            frame_delay_ms: DEFAULT_FRAME_DELAY_MS,
        }
    }
}

impl AppConfig {
    #[must_use]
    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms)
    }

    pub fn clamp_all(&mut self) {
        self.hints.width = self.hints.width.clamp(16, 7680);
        self.hints.height = self.hints.height.clamp(16, 4320);
        self.hints.fps = self.hints.fps.clamp(1, 120);
        self.frame_delay_ms = self.frame_delay_ms.min(5_000);
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    capture: Option<CaptureSection>,
    frame_delay_ms: Option<u64>,
}

#[derive(Deserialize)]
struct CaptureSection {
    device: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
    fps: Option<u32>,
}

/// Parse a TOML document. Absent keys keep their default value.
///
/// # Errors
/// Returns an error if the document is not valid TOML or has wrong types.
///
/// # Example
/// ```
/// use ac_core::config::parse_config;
/// let config = parse_config("[capture]\ndevice = 2\nfps = 15\n").unwrap();
/// assert_eq!(config.device, 2);
/// assert_eq!(config.hints.fps, 15);
/// assert_eq!(config.hints.width, 640);
/// ```
pub fn parse_config(content: &str) -> Result<AppConfig> {
    let file: ConfigFile = toml::from_str(content).context("TOML invalide")?;
    let mut config = AppConfig::default();

    if let Some(c) = file.capture {
        if let Some(v) = c.device {
            config.device = v;
        }
        if let Some(v) = c.width {
            config.hints.width = v;
        }
        if let Some(v) = c.height {
            config.hints.height = v;
        }
        if let Some(v) = c.fps {
            config.hints.fps = v;
        }
    }
    if let Some(v) = file.frame_delay_ms {
        config.frame_delay_ms = v;
    }

    let requested = config.clone();
    config.clamp_all();
    if config != requested {
        log::warn!("Valeurs de config hors bornes ramenées dans les limites : {config:?}");
    }
    Ok(config)
}

/// Charge la configuration depuis un fichier TOML.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Config invalide : {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(parse_config("").unwrap(), AppConfig::default());
    }

    #[test]
    fn values_are_clamped() {
        let config = parse_config("frame_delay_ms = 999999\n[capture]\nfps = 0\nwidth = 1\n").unwrap();
        assert_eq!(config.hints.fps, 1);
        assert_eq!(config.hints.width, 16);
        assert_eq!(config.frame_delay_ms, 5_000);
    }

    #[test]
    fn wrong_type_is_an_error() {
        assert!(parse_config("[capture]\ndevice = \"zero\"\n").is_err());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "frame_delay_ms = 40").unwrap();
        writeln!(file, "[capture]").unwrap();
        writeln!(file, "width = 320").unwrap();
        writeln!(file, "height = 240").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.frame_delay(), Duration::from_millis(40));
        assert_eq!(config.hints.width, 320);
        assert_eq!(config.hints.height, 240);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn shipped_sample_matches_defaults() {
        let sample = include_str!("../../../config/asciicam.toml");
        assert_eq!(parse_config(sample).unwrap(), AppConfig::default());
    }

    #[test]
    fn mode_widths() {
        assert_eq!(RenderMode::Mono.width(), MONO_WIDTH);
        assert_eq!(RenderMode::Color.width(), COLOR_WIDTH);
        assert_eq!(RenderMode::default(), RenderMode::Mono);
    }
}
