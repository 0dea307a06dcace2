use std::cell::RefCell;
use std::fmt;

use ac_core::charset::Palette;
use ac_core::config::RenderMode;
use ac_core::error::CoreError;
use ac_core::frame::Frame;
use ac_source::transform::{self, Resizer};

use crate::error::RenderError;
use crate::grid::{AsciiCell, AsciiGrid};

/// Correction d'aspect : une cellule terminal est ~2× plus haute que large.
const CELL_ASPECT: f64 = 0.5;

/// Hauteur de sortie proportionnelle : `max(1, round(Tw × H / W × 0.5))`.
///
/// # Errors
/// [`CoreError::InvalidFrameGeometry`] if the frame has a zero dimension,
/// [`CoreError::InvalidTargetWidth`] if `target_width` is zero.
///
/// # Example
/// ```
/// use ac_ascii::render::target_height;
/// assert_eq!(target_height(640, 480, 120).unwrap(), 45);
/// assert_eq!(target_height(64, 64, 8).unwrap(), 4);
/// assert_eq!(target_height(1000, 1, 10).unwrap(), 1);
/// assert!(target_height(0, 480, 120).is_err());
/// ```
pub fn target_height(frame_width: u32, frame_height: u32, target_width: u32) -> Result<u32, CoreError> {
    scaled_height(frame_width, frame_height, target_width, CELL_ASPECT)
}

fn scaled_height(frame_width: u32, frame_height: u32, target_width: u32, aspect: f64) -> Result<u32, CoreError> {
    if frame_width == 0 || frame_height == 0 {
        return Err(CoreError::InvalidFrameGeometry {
            width: frame_width,
            height: frame_height,
        });
    }
    if target_width == 0 {
        return Err(CoreError::InvalidTargetWidth(target_width));
    }
    let ratio = f64::from(frame_height) / f64::from(frame_width);
    let height = (f64::from(target_width) * ratio * aspect).round();
    Ok((height.min(f64::from(u32::MAX)) as u32).max(1))
}

/// Convertit une frame raster en bloc texte, monochrome ou coloré.
///
/// Tient la palette, le facteur d'aspect des cellules et un [`Resizer`]
/// réutilisé d'une frame à l'autre. Le rendu reste pur : même frame + même
/// largeur → octets identiques.
///
/// # Example
/// ```
/// use ac_ascii::render::FrameRenderer;
/// use ac_core::frame::{Frame, PixelLayout};
///
/// let renderer = FrameRenderer::default();
/// let black = Frame::filled(64, 64, PixelLayout::Rgb, 0);
/// let text = renderer.render(&black, 8).unwrap();
/// assert_eq!(text, "@@@@@@@@\n".repeat(4));
/// ```
pub struct FrameRenderer {
    palette: Palette,
    aspect: f64,
    /// Scratch du resize ; `RefCell` pour garder `&self` sur le rendu.
    resizer: RefCell<Resizer>,
}

impl FrameRenderer {
    #[must_use]
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            aspect: CELL_ASPECT,
            resizer: RefCell::new(Resizer::new()),
        }
    }

    /// Remplace le facteur d'aspect (hauteur / largeur d'une cellule,
    /// inversé). Une valeur non finie ou ≤ 0 est ignorée.
    ///
    /// # Example
    /// ```
    /// use ac_ascii::render::FrameRenderer;
    /// use ac_core::frame::{Frame, PixelLayout};
    /// let square = FrameRenderer::default().with_aspect(1.0);
    /// let text = square.render(&Frame::filled(64, 64, PixelLayout::Rgb, 0), 8).unwrap();
    /// assert_eq!(text.lines().count(), 8);
    /// ```
    #[must_use]
    pub fn with_aspect(mut self, aspect: f64) -> Self {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        } else {
            log::warn!("Facteur d'aspect {aspect} ignoré, {} conservé", self.aspect);
        }
        self
    }

    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    #[must_use]
    pub fn aspect(&self) -> f64 {
        self.aspect
    }

    /// Construit la grille de sortie sans la sérialiser.
    ///
    /// 1. hauteur cible (voir [`target_height`], avec l'aspect du renderer)
    /// 2. resize (moyenne de zone) à `target_width × hauteur`
    /// 3. luminance pour le choix du glyphe
    /// 4. en mode couleur, RGB de la même frame réduite
    ///
    /// # Errors
    /// See [`RenderError`].
    pub fn grid(&self, frame: &Frame, target_width: u32, mode: RenderMode) -> Result<AsciiGrid, RenderError> {
        let height = scaled_height(frame.width(), frame.height(), target_width, self.aspect)?;
        log::trace!(
            "{}x{} → grille {target_width}x{height} ({mode:?})",
            frame.width(),
            frame.height()
        );
        let small = self.resizer.borrow_mut().resize(frame, target_width, height)?;
        let luma = transform::to_grayscale(&small);
        let rgb = match mode {
            RenderMode::Mono => None,
            RenderMode::Color => Some(transform::to_rgb(&small)),
        };

        let mut grid = AsciiGrid::new(target_width, height);
        for y in 0..height {
            for x in 0..target_width {
                let ch = self.palette.quantize(i32::from(luma.luminance(x, y)));
                let fg = rgb.as_ref().map(|f| f.rgb(x, y));
                grid.set(x, y, AsciiCell { ch, fg });
            }
        }
        Ok(grid)
    }

    /// Variante monochrome.
    ///
    /// # Errors
    /// See [`RenderError`].
    pub fn render(&self, frame: &Frame, target_width: u32) -> Result<String, RenderError> {
        Ok(self.grid(frame, target_width, RenderMode::Mono)?.to_string())
    }

    /// Variante colorée : chaque glyphe est précédé de sa couleur RGB exacte
    /// et suivi d'un reset.
    ///
    /// # Errors
    /// See [`RenderError`].
    pub fn render_colored(&self, frame: &Frame, target_width: u32) -> Result<String, RenderError> {
        Ok(self.grid(frame, target_width, RenderMode::Color)?.to_string())
    }

    /// Dispatch on `mode`, using the mode's fixed width.
    ///
    /// # Errors
    /// See [`RenderError`].
    pub fn render_mode(&self, frame: &Frame, mode: RenderMode) -> Result<String, RenderError> {
        match mode {
            RenderMode::Mono => self.render(frame, mode.width()),
            RenderMode::Color => self.render_colored(frame, mode.width()),
        }
    }
}

impl Default for FrameRenderer {
    fn default() -> Self {
        Self::new(Palette::default())
    }
}

impl Clone for FrameRenderer {
    fn clone(&self) -> Self {
        Self::new(self.palette.clone()).with_aspect(self.aspect)
    }
}

impl fmt::Debug for FrameRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameRenderer")
            .field("palette", &self.palette)
            .field("aspect", &self.aspect)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_core::frame::PixelLayout;

    /// Retire les séquences CSI `ESC [ ... m`.
    fn strip_ansi(s: &str) -> String {
        let mut out = String::new();
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                for c in chars.by_ref() {
                    if c == 'm' {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    fn gradient(width: u32, height: u32) -> Frame {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 90]);
            }
        }
        Frame::new(data, width, height, PixelLayout::Rgb).unwrap()
    }

    #[test]
    fn target_height_formula() {
        for (w, h) in [(640, 480), (1280, 720), (64, 64), (300, 17), (17, 300), (1, 1)] {
            for tw in [1, 8, 80, 100, 120] {
                let expected = ((f64::from(h) / f64::from(w) * f64::from(tw) * 0.5).round() as u32).max(1);
                assert_eq!(target_height(w, h, tw).unwrap(), expected, "{w}x{h} @ {tw}");
            }
        }
    }

    #[test]
    fn target_height_never_zero() {
        assert_eq!(target_height(4000, 10, 8).unwrap(), 1);
    }

    #[test]
    fn zero_target_width_rejected() {
        assert_eq!(target_height(10, 10, 0), Err(CoreError::InvalidTargetWidth(0)));
    }

    #[test]
    fn all_black_is_darkest_glyph() {
        let renderer = FrameRenderer::default();
        let frame = Frame::filled(64, 64, PixelLayout::Luma, 0);
        let text = renderer.render(&frame, 8).unwrap();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), target_height(64, 64, 8).unwrap() as usize);
        for row in rows {
            assert_eq!(row.chars().count(), 8);
            assert!(row.chars().all(|c| c == renderer.palette().darkest()));
        }
    }

    #[test]
    fn all_white_is_lightest_glyph() {
        let renderer = FrameRenderer::default();
        let frame = Frame::filled(64, 64, PixelLayout::Rgb, 255);
        let text = renderer.render(&frame, 8).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert!(
            text.lines()
                .all(|row| row.chars().count() == 8 && row.chars().all(|c| c == renderer.palette().lightest()))
        );
    }

    #[test]
    fn zero_geometry_is_reported() {
        let renderer = FrameRenderer::default();
        for (w, h) in [(0, 64), (64, 0), (0, 0)] {
            let frame = Frame::filled(w, h, PixelLayout::Rgb, 0);
            let err = renderer.render(&frame, 8).unwrap_err();
            assert!(err.is_invalid_geometry(), "{w}x{h}: {err}");
            let err = renderer.render_colored(&frame, 8).unwrap_err();
            assert!(err.is_invalid_geometry());
        }
    }

    #[test]
    fn row_shape_matches_grid() {
        let renderer = FrameRenderer::default();
        let frame = gradient(640, 480);
        for text in [
            renderer.render(&frame, 120).unwrap(),
            renderer.render_colored(&frame, 100).unwrap(),
        ] {
            let plain = strip_ansi(&text);
            let rows: Vec<&str> = plain.split_terminator('\n').collect();
            let width = rows[0].chars().count() as u32;
            assert_eq!(rows.len() as u32, target_height(640, 480, width).unwrap());
            assert!(rows.iter().all(|r| r.chars().count() as u32 == width));
            assert!(text.ends_with('\n'));
        }
    }

    #[test]
    fn colored_cell_wraps_exact_rgb() {
        let renderer = FrameRenderer::default();
        let frame = Frame::filled(10, 20, PixelLayout::Rgb, 0);
        let frame = Frame::new(
            frame.data().chunks_exact(3).flat_map(|_| [10u8, 20, 30]).collect(),
            10,
            20,
            PixelLayout::Rgb,
        )
        .unwrap();
        let grid = renderer.grid(&frame, 2, RenderMode::Color).unwrap();
        let cell = *grid.get(0, 0);
        assert_eq!(cell.fg, Some((10, 20, 30)));
        let text = grid.to_string();
        let expected_cell = format!("\x1b[38;2;10;20;30m{}\x1b[0m", cell.ch);
        assert!(text.starts_with(&expected_cell));
        // Chaque glyphe visible est suivi d'un reset.
        assert_eq!(text.matches("\x1b[0m").count(), (grid.width * grid.height) as usize);
        assert_eq!(text.matches("\x1b[38;2;").count(), (grid.width * grid.height) as usize);
    }

    #[test]
    fn mono_output_has_no_escapes() {
        let renderer = FrameRenderer::default();
        let text = renderer.render(&gradient(64, 48), 16).unwrap();
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn rendering_is_idempotent() {
        let renderer = FrameRenderer::default();
        let frame = gradient(320, 240);
        assert_eq!(renderer.render(&frame, 80).unwrap(), renderer.render(&frame, 80).unwrap());
        assert_eq!(
            renderer.render_colored(&frame, 80).unwrap(),
            renderer.render_colored(&frame, 80).unwrap()
        );
    }

    #[test]
    fn custom_palette_is_used() {
        let renderer = FrameRenderer::new(Palette::new("X").unwrap());
        let text = renderer.render(&gradient(32, 32), 4).unwrap();
        assert_eq!(text, "XXXX\nXXXX\n");
    }

    #[test]
    fn render_mode_uses_fixed_widths() {
        let renderer = FrameRenderer::default();
        let frame = gradient(640, 480);
        let mono = renderer.render_mode(&frame, RenderMode::Mono).unwrap();
        assert_eq!(mono.lines().next().map(|l| l.chars().count()), Some(120));
        let color = renderer.render_mode(&frame, RenderMode::Color).unwrap();
        let first = strip_ansi(color.lines().next().unwrap_or_default());
        assert_eq!(first.chars().count(), 100);
    }

    #[test]
    fn aspect_factor_drives_row_count() {
        let frame = gradient(64, 64);
        let square = FrameRenderer::default().with_aspect(1.0);
        assert_eq!(square.render(&frame, 8).unwrap().lines().count(), 8);
        let flat = FrameRenderer::default().with_aspect(0.25);
        assert_eq!(flat.render(&frame, 8).unwrap().lines().count(), 2);
    }

    #[test]
    fn invalid_aspect_is_ignored() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let renderer = FrameRenderer::default().with_aspect(bad);
            assert!((renderer.aspect() - CELL_ASPECT).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn clone_keeps_palette_and_aspect() {
        let renderer = FrameRenderer::new(Palette::new("ab").unwrap()).with_aspect(1.0);
        let copy = renderer.clone();
        assert_eq!(copy.palette().glyphs(), renderer.palette().glyphs());
        assert!((copy.aspect() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reused_renderer_handles_changing_frame_sizes() {
        let renderer = FrameRenderer::default();
        let sizes = [(640, 480), (64, 48), (1280, 720), (640, 480)];
        for (w, h) in sizes {
            let text = renderer.render(&gradient(w, h), 40).unwrap();
            assert_eq!(text.lines().count() as u32, target_height(w, h, 40).unwrap());
        }
    }

    #[test]
    fn left_to_right_gradient_brightens() {
        // Luminance croissante de gauche à droite → indices de palette décroissants.
        let renderer = FrameRenderer::default();
        let mut data = Vec::new();
        for _ in 0..8 {
            for x in 0..256u32 {
                data.push(x as u8);
            }
        }
        let frame = Frame::new(data, 256, 8, PixelLayout::Luma).unwrap();
        let grid = renderer.grid(&frame, 12, RenderMode::Mono).unwrap();
        let glyphs = renderer.palette().glyphs();
        let idx = |x| glyphs.iter().position(|&g| g == grid.get(x, 0).ch).unwrap();
        assert_eq!(idx(0), 0);
        assert_eq!(idx(11), glyphs.len() - 1);
        for x in 1..12 {
            assert!(idx(x) >= idx(x - 1));
        }
    }
}
