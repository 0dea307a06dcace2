use std::fmt;

use crossterm::Command;
use crossterm::style::{Color, ResetColor, SetForegroundColor};

/// Single cell in the output grid.
///
/// # Example
/// ```
/// use ac_ascii::grid::AsciiCell;
/// let cell = AsciiCell::default();
/// assert_eq!(cell.ch, ' ');
/// assert!(cell.fg.is_none());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AsciiCell {
    /// Caractère à afficher.
    pub ch: char,
    /// Couleur foreground (RGB). `None` en monochrome.
    pub fg: Option<(u8, u8, u8)>,
}

impl Default for AsciiCell {
    fn default() -> Self {
        Self { ch: ' ', fg: None }
    }
}

/// Grille de sortie d'une frame. Construite, sérialisée puis jetée.
///
/// `Display` produit le bloc texte final : une ligne par rangée, chaque
/// rangée terminée par `\n`. Une cellule colorée est encadrée par
/// `ESC[38;2;R;G;Bm` et `ESC[0m`, la couleur ne déborde donc jamais sur
/// la cellule suivante.
///
/// # Example
/// ```
/// use ac_ascii::grid::{AsciiCell, AsciiGrid};
/// let mut grid = AsciiGrid::new(2, 1);
/// grid.set(0, 0, AsciiCell { ch: '@', fg: None });
/// grid.set(1, 0, AsciiCell { ch: '#', fg: Some((1, 2, 3)) });
/// assert_eq!(grid.to_string(), "@\x1b[38;2;1;2;3m#\x1b[0m\n");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsciiGrid {
    /// Flat array of cells, row-major.
    pub cells: Vec<AsciiCell>,
    /// Width in characters.
    pub width: u32,
    /// Height in characters.
    pub height: u32,
}

impl AsciiGrid {
    /// Crée une grille remplie de cellules par défaut.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            cells: vec![AsciiCell::default(); width as usize * height as usize],
            width,
            height,
        }
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, cell: AsciiCell) {
        self.cells[y as usize * self.width as usize + x as usize] = cell;
    }

    #[inline]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> &AsciiCell {
        &self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[AsciiCell]> {
        self.cells.chunks(self.width.max(1) as usize)
    }
}

impl fmt::Display for AsciiCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fg {
            None => write!(f, "{}", self.ch),
            Some((r, g, b)) => {
                SetForegroundColor(Color::Rgb { r, g, b }).write_ansi(f)?;
                write!(f, "{}", self.ch)?;
                ResetColor.write_ansi(f)
            }
        }
    }
}

impl fmt::Display for AsciiGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.width == 0 {
            return Ok(());
        }
        for row in self.rows() {
            for cell in row {
                write!(f, "{cell}")?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}
