use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Granularité du sommeil interruptible.
const SLEEP_SLICE: Duration = Duration::from_millis(10);

/// Jeton d'annulation coopératif, partagé entre le handler Ctrl+C et la boucle.
///
/// Cloner le jeton partage le même drapeau.
///
/// # Example
/// ```
/// use ac_core::cancel::CancelToken;
/// let token = CancelToken::new();
/// let handle = token.clone();
/// assert!(!token.is_cancelled());
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Demande l'arrêt. Appelable depuis n'importe quel thread.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Dort `duration` par tranches courtes en surveillant le drapeau.
    ///
    /// Retourne `true` si l'annulation est survenue avant la fin du délai.
    ///
    /// # Example
    /// ```
    /// use ac_core::cancel::CancelToken;
    /// use std::time::Duration;
    /// let token = CancelToken::new();
    /// token.cancel();
    /// assert!(token.sleep(Duration::from_secs(60)));
    /// ```
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.is_cancelled() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            thread::sleep(SLEEP_SLICE.min(deadline - now));
        }
    }
}
