use std::io;
use std::path::Path;
use std::process::ExitCode;

use ac_ascii::render::FrameRenderer;
use ac_core::cancel::CancelToken;
use ac_core::config::{AppConfig, RenderMode, load_config};
use anyhow::{Context, Result};
use clap::Parser;

pub mod cli;
pub mod pacing;
pub mod prompt;
pub mod session;
pub mod terminal;

use session::{Session, SessionOutcome, SessionReport};
use terminal::CrosstermTerminal;

fn main() -> Result<ExitCode> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new().filter_level(cli.log_filter()).init();

    // 3. Charger la config
    let config = resolve_config(cli.config.as_deref())?;

    // 4. Choisir la variante (CLI, sinon question interactive)
    let mode = match cli.mode {
        Some(arg) => RenderMode::from(arg),
        None => prompt::ask_mode(&mut io::stdin().lock(), &mut io::stdout())
            .context("Lecture du choix de mode impossible")?,
    };
    log::info!("Mode : {} ({} colonnes)", mode.label(), mode.width());

    // 5. Ctrl+C → annulation coopérative
    let token = CancelToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || handler_token.cancel()).context("Installation du handler Ctrl+C impossible")?;

    // 6. Terminal (curseur masqué jusqu'à la fin de session)
    let mut terminal = CrosstermTerminal::stdout().context("Initialisation du terminal impossible")?;

    // 7. Boucle de capture. Libère caméra et terminal sur tous les chemins.
    let renderer = FrameRenderer::default();
    let session = Session::new(&config, mode, &renderer, token);
    #[cfg(feature = "webcam")]
    let report = session.run(ac_source::webcam::NokhwaCamera::open, &mut terminal);
    #[cfg(not(feature = "webcam"))]
    let report = session.run(
        |index| ac_source::ffmpeg::FfmpegCamera::open_with(index, &config.hints),
        &mut terminal,
    );
    drop(terminal);

    // 8. Bilan
    if report.outcome.is_success() {
        println!("{}", exit_message(&report));
    } else {
        eprintln!("{}", exit_message(&report));
    }
    Ok(if report.outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Texte affiché à la sortie : « Fermeture... » et bilan sur annulation,
/// la cause sinon.
fn exit_message(report: &SessionReport) -> String {
    match &report.outcome {
        SessionOutcome::Cancelled => format!(
            "\nFermeture...\n{} frames affichées, {:.1} fps (plafond {:.1}), {:.1} ms de rendu moyen.",
            report.frames,
            report.pace.fps,
            report.pace.nominal_fps,
            report.pace.mean_work.as_secs_f64() * 1000.0
        ),
        other => format!("\n{other}"),
    }
}

/// Config depuis `--config`. Fichier absent → défauts + warning ; fichier
/// illisible ou invalide → erreur.
fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };
    if !path.exists() {
        log::warn!("Config {} introuvable, valeurs par défaut utilisées.", path.display());
        return Ok(AppConfig::default());
    }
    let config = load_config(path)?;
    log::info!("Config chargée : {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn report(outcome: SessionOutcome, frames: u64) -> SessionReport {
        SessionReport {
            outcome,
            frames,
            pace: pacing::PaceSummary {
                frames,
                fps: 9.5,
                nominal_fps: 10.0,
                mean_work: std::time::Duration::from_millis(5),
            },
        }
    }

    #[test]
    fn cancellation_says_goodbye_with_summary() {
        let text = exit_message(&report(SessionOutcome::Cancelled, 42));
        assert!(text.contains("Fermeture..."));
        assert!(text.contains("42 frames"));
        assert!(text.contains("9.5 fps"));
    }

    #[test]
    fn failures_report_their_cause() {
        let text = exit_message(&report(SessionOutcome::DeviceUnavailable("occupée".into()), 0));
        assert!(text.contains("impossible d'ouvrir la webcam"));
        assert!(text.contains("occupée"));
        assert!(!text.contains("Fermeture"));
        let text = exit_message(&report(SessionOutcome::StreamEnded, 3));
        assert!(text.contains("impossible de lire une frame"));
    }

    #[test]
    fn no_config_flag_gives_defaults() {
        assert_eq!(resolve_config(None).unwrap(), AppConfig::default());
    }

    #[test]
    fn missing_config_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert_eq!(resolve_config(Some(&path)).unwrap(), AppConfig::default());
    }

    #[test]
    fn invalid_config_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[capture").unwrap();
        assert!(resolve_config(Some(file.path())).is_err());
    }

    #[test]
    fn valid_config_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[capture]\ndevice = 1").unwrap();
        assert_eq!(resolve_config(Some(file.path())).unwrap().device, 1);
    }
}
