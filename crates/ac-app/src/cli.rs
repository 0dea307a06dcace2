use std::path::PathBuf;

use ac_core::config::RenderMode;
use clap::{Parser, ValueEnum};

/// asciicam — Webcam en direct rendue en art ASCII dans le terminal.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Variante de rendu. Absente : le choix est demandé au lancement.
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Fichier de configuration TOML (périphérique, résolution, délai).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// Valeurs acceptées par `--mode`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Noir et blanc, 120 colonnes.
    Mono,
    /// Couleur truecolor, 100 colonnes.
    Color,
}

impl From<ModeArg> for RenderMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Mono => Self::Mono,
            ModeArg::Color => Self::Color,
        }
    }
}

impl Cli {
    /// Log filter from `--log-level`, `warn` if unparseable.
    #[must_use]
    pub fn log_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Warn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["asciicam"]).unwrap();
        assert!(cli.mode.is_none());
        assert!(cli.config.is_none());
        assert_eq!(cli.log_filter(), log::LevelFilter::Warn);
    }

    #[test]
    fn mode_and_config() {
        let cli =
            Cli::try_parse_from(["asciicam", "--mode", "color", "-c", "cam.toml", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.mode.map(RenderMode::from), Some(RenderMode::Color));
        assert_eq!(cli.config, Some(PathBuf::from("cam.toml")));
        assert_eq!(cli.log_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(Cli::try_parse_from(["asciicam", "--mode", "braille"]).is_err());
    }

    #[test]
    fn bad_log_level_falls_back_to_warn() {
        let cli = Cli::try_parse_from(["asciicam", "--log-level", "loud"]).unwrap();
        assert_eq!(cli.log_filter(), log::LevelFilter::Warn);
    }
}
