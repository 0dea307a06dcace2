use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Nombre de frames prises en compte pour les moyennes glissantes.
pub const PACE_WINDOW: usize = 30;

/// Mesure du rythme réel de la boucle face à son délai fixe.
///
/// Le délai entre frames n'est pas compensé : la période réelle vaut
/// `lecture + rendu + écriture + délai`. On enregistre pour chaque frame
/// l'instant d'affichage et le temps de travail (lecture → écriture), ce
/// qui donne le FPS effectif et l'écart à la cadence nominale `1 / délai`.
#[derive(Debug)]
pub struct PaceMeter {
    delay: Duration,
    /// (instant d'affichage, travail) des dernières frames.
    samples: VecDeque<(Instant, Duration)>,
    frames: u64,
}

/// Bilan de fin de session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaceSummary {
    pub frames: u64,
    /// FPS effectif sur la fenêtre.
    pub fps: f64,
    /// Cadence si le travail était instantané.
    pub nominal_fps: f64,
    /// Travail moyen par frame sur la fenêtre.
    pub mean_work: Duration,
}

impl PaceMeter {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            samples: VecDeque::with_capacity(PACE_WINDOW + 1),
            frames: 0,
        }
    }

    /// Enregistre une frame affichée à `shown_at` après `work` de travail.
    pub fn record(&mut self, shown_at: Instant, work: Duration) {
        self.frames += 1;
        self.samples.push_back((shown_at, work));
        if self.samples.len() > PACE_WINDOW {
            self.samples.pop_front();
        }
    }

    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Images par seconde réellement affichées. 0 tant qu'il n'y a pas deux frames.
    #[must_use]
    pub fn fps(&self) -> f64 {
        match (self.samples.front(), self.samples.back()) {
            (Some(&(first, _)), Some(&(last, _))) if self.samples.len() >= 2 => {
                let secs = last.duration_since(first).as_secs_f64();
                if secs > 0.0 {
                    (self.samples.len() - 1) as f64 / secs
                } else {
                    0.0
                }
            }
            _ => 0.0,
        }
    }

    /// Cadence plafond imposée par le délai seul. Infinie pour un délai nul.
    #[must_use]
    pub fn nominal_fps(&self) -> f64 {
        1.0 / self.delay.as_secs_f64()
    }

    #[must_use]
    pub fn mean_work(&self) -> Duration {
        let Ok(n) = u32::try_from(self.samples.len()) else {
            return Duration::ZERO;
        };
        if n == 0 {
            return Duration::ZERO;
        }
        self.samples.iter().map(|&(_, work)| work).sum::<Duration>() / n
    }

    /// Dernier temps de travail, pour les logs par frame.
    #[must_use]
    pub fn last_work(&self) -> Duration {
        self.samples.back().map_or(Duration::ZERO, |&(_, work)| work)
    }

    #[must_use]
    pub fn summary(&self) -> PaceSummary {
        PaceSummary {
            frames: self.frames,
            fps: self.fps(),
            nominal_fps: self.nominal_fps(),
            mean_work: self.mean_work(),
        }
    }
}
