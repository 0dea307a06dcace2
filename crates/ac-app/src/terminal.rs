use std::io::{self, Write};

use ac_core::traits::Terminal;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::ResetColor;
use crossterm::terminal::{Clear, ClearType};
use crossterm::{execute, queue};

/// Terminal crossterm sur un flux quelconque (stdout en production).
///
/// Curseur masqué à la construction ; [`Terminal::release`] le réaffiche et
/// remet les couleurs à zéro. `Drop` appelle `release`, l'état du terminal
/// est donc restauré sur tous les chemins de sortie.
pub struct CrosstermTerminal<W: Write> {
    out: W,
    active: bool,
}

impl<W: Write> CrosstermTerminal<W> {
    /// # Errors
    /// Returns the I/O error from hiding the cursor.
    pub fn new(mut out: W) -> io::Result<Self> {
        execute!(out, Hide)?;
        Ok(Self { out, active: true })
    }

    #[must_use]
    pub fn get_ref(&self) -> &W {
        &self.out
    }
}

impl CrosstermTerminal<io::Stdout> {
    /// # Errors
    /// See [`CrosstermTerminal::new`].
    pub fn stdout() -> io::Result<Self> {
        Self::new(io::stdout())
    }
}

impl<W: Write> Terminal for CrosstermTerminal<W> {
    fn clear(&mut self) -> io::Result<()> {
        // Mis en file : le flush de write_text envoie effacement et frame d'un bloc.
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }

    fn release(&mut self) {
        if self.active {
            self.active = false;
            if let Err(e) = execute!(self.out, ResetColor, Show) {
                log::warn!("Restauration du terminal impossible : {e}");
            }
        }
    }
}

impl<W: Write> Drop for CrosstermTerminal<W> {
    fn drop(&mut self) {
        self.release();
    }
}
