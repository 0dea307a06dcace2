// Boucle de capture : Opened → Running → Closed.
//
// Une seule frame en vol : lecture → miroir → rendu → effacement → écriture
// → pause fixe. Aucune erreur ne remonte au-delà de `run` ; tout se termine
// par un `SessionOutcome`, périphérique et terminal libérés.

use std::fmt;
use std::io;
use std::time::Instant;

use ac_ascii::render::FrameRenderer;
use ac_core::cancel::CancelToken;
use ac_core::config::{AppConfig, RenderMode};
use ac_core::traits::{CaptureDevice, Terminal};
use ac_source::error::SourceError;
use ac_source::transform;

use crate::pacing::{PaceMeter, PaceSummary};

/// Fin de session.
#[derive(Debug)]
pub enum SessionOutcome {
    /// Interruption utilisateur. Terminaison normale.
    Cancelled,
    /// Le périphérique n'a plus fourni de frame.
    StreamEnded,
    /// Le périphérique n'a pas pu être acquis ; aucune frame lue.
    DeviceUnavailable(String),
    /// Frame de géométrie nulle ou rendu impossible.
    InvalidFrame(String),
    /// Écriture terminal impossible.
    Terminal(io::Error),
}

impl SessionOutcome {
    /// `true` for cancellation, the only exit the user asked for.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "Arrêt demandé"),
            Self::StreamEnded => write!(f, "Erreur : impossible de lire une frame"),
            Self::DeviceUnavailable(reason) => write!(f, "Erreur : impossible d'ouvrir la webcam ({reason})"),
            Self::InvalidFrame(reason) => write!(f, "Erreur : frame invalide ({reason})"),
            Self::Terminal(e) => write!(f, "Erreur terminal : {e}"),
        }
    }
}

/// Résultat d'une session.
#[derive(Debug)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    /// Frames effectivement affichées.
    pub frames: u64,
    /// Rythme mesuré face au délai fixe.
    pub pace: PaceSummary,
}

/// Paramètres figés à la construction de la session.
pub struct Session<'a> {
    config: &'a AppConfig,
    mode: RenderMode,
    renderer: &'a FrameRenderer,
    token: CancelToken,
}

/// Libère le périphérique même en cas de panique pendant la boucle.
struct DeviceGuard<D: CaptureDevice>(D);

impl<D: CaptureDevice> Drop for DeviceGuard<D> {
    fn drop(&mut self) {
        self.0.release();
    }
}

/// Idem pour l'état du terminal.
struct TerminalGuard<'t, T: Terminal>(&'t mut T);

impl<T: Terminal> Drop for TerminalGuard<'_, T> {
    fn drop(&mut self) {
        self.0.release();
    }
}

impl<'a> Session<'a> {
    #[must_use]
    pub fn new(config: &'a AppConfig, mode: RenderMode, renderer: &'a FrameRenderer, token: CancelToken) -> Self {
        Self {
            config,
            mode,
            renderer,
            token,
        }
    }

    /// Ouvre le périphérique via `open`, puis boucle jusqu'à annulation ou échec.
    ///
    /// `open` reçoit l'index configuré. Le périphérique et le terminal sont
    /// libérés avant le retour, quel que soit le chemin de sortie.
    pub fn run<D, T, F>(&self, open: F, terminal: &mut T) -> SessionReport
    where
        D: CaptureDevice,
        T: Terminal,
        F: FnOnce(u32) -> Result<D, SourceError>,
    {
        let mut terminal = TerminalGuard(terminal);

        let mut device = match open(self.config.device) {
            Ok(device) => DeviceGuard(device),
            Err(e) => {
                log::error!("Ouverture du périphérique {} impossible : {e}", self.config.device);
                return SessionReport {
                    outcome: SessionOutcome::DeviceUnavailable(e.to_string()),
                    frames: 0,
                    pace: PaceMeter::new(self.config.frame_delay()).summary(),
                };
            }
        };
        device.0.configure(&self.config.hints);
        log::info!(
            "Session {} ({} colonnes), délai {} ms",
            self.mode.label(),
            self.mode.width(),
            self.config.frame_delay_ms
        );

        let mut pace = PaceMeter::new(self.config.frame_delay());
        let outcome = loop {
            if self.token.is_cancelled() {
                break SessionOutcome::Cancelled;
            }

            let started = Instant::now();

            let Some(frame) = device.0.read_frame() else {
                // Un Ctrl+C pendant la lecture peut aussi couper le flux.
                break if self.token.is_cancelled() {
                    SessionOutcome::Cancelled
                } else {
                    SessionOutcome::StreamEnded
                };
            };

            let mirrored = transform::flip_horizontal(&frame);
            let text = match self.renderer.render_mode(&mirrored, self.mode) {
                Ok(text) => text,
                Err(e) => break SessionOutcome::InvalidFrame(e.to_string()),
            };

            if let Err(e) = terminal.0.clear().and_then(|()| terminal.0.write_text(&text)) {
                break SessionOutcome::Terminal(e);
            }
            pace.record(Instant::now(), started.elapsed());
            log::debug!(
                "frame {} : {:.1} ms de travail, {:.1} fps (plafond {:.1})",
                pace.frames(),
                pace.last_work().as_secs_f64() * 1000.0,
                pace.fps(),
                pace.nominal_fps()
            );

            if self.token.sleep(self.config.frame_delay()) {
                break SessionOutcome::Cancelled;
            }
        };

        device.0.release();
        terminal.0.release();
        let summary = pace.summary();
        log::info!(
            "Session terminée après {} frames ({:.1} fps, {:.1} ms de travail moyen) : {outcome}",
            summary.frames,
            summary.fps,
            summary.mean_work.as_secs_f64() * 1000.0
        );

        SessionReport {
            outcome,
            frames: summary.frames,
            pace: summary,
        }
    }
}
