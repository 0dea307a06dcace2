use crate::error::CoreError;

/// 12 caractères, du plus dense (sombre) au plus clair (espace).
pub const PALETTE_DEFAULT: &str = "@#S%?*+;:,. ";

/// Ordered glyph palette used by the quantizer.
///
/// Index 0 is the densest glyph, the last index the lightest. A palette is
/// never empty and never changes once built.
///
/// # Example
/// ```
/// use ac_core::charset::Palette;
/// let palette = Palette::new("@:. ").unwrap();
/// assert_eq!(palette.quantize(0), '@');
/// assert_eq!(palette.quantize(255), ' ');
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    glyphs: Vec<char>,
}

impl Palette {
    /// Build a palette from a string ordered densest→lightest.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] if `glyphs` is empty.
    pub fn new(glyphs: &str) -> Result<Self, CoreError> {
        let glyphs: Vec<char> = glyphs.chars().collect();
        if glyphs.is_empty() {
            return Err(CoreError::Config("palette vide".into()));
        }
        Ok(Self { glyphs })
    }

    /// Number of glyphs.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Always `false`; kept for clippy's `len_without_is_empty`.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    #[must_use]
    pub fn glyphs(&self) -> &[char] {
        &self.glyphs
    }

    /// Densest glyph (index 0).
    #[must_use]
    pub fn darkest(&self) -> char {
        self.glyphs[0]
    }

    /// Lightest glyph (last index).
    #[must_use]
    pub fn lightest(&self) -> char {
        self.glyphs[self.glyphs.len() - 1]
    }

    /// Bucket index for a luminance sample.
    ///
    /// The sample is clamped to `[0, 255]` first, then
    /// `index = min(lum × N / 256, N − 1)`.
    ///
    /// # Example
    /// ```
    /// use ac_core::charset::Palette;
    /// let palette = Palette::new("@#S%?*+;:,. ").unwrap();
    /// assert_eq!(palette.quantize_index(0), 0);
    /// assert_eq!(palette.quantize_index(128), 6);
    /// assert_eq!(palette.quantize_index(255), 11);
    /// assert_eq!(palette.quantize_index(-5), 0);
    /// assert_eq!(palette.quantize_index(300), 11);
    /// ```
    #[inline]
    #[must_use]
    pub fn quantize_index(&self, luminance: i32) -> usize {
        let lum = luminance.clamp(0, 255) as usize;
        (lum * self.glyphs.len() / 256).min(self.glyphs.len() - 1)
    }

    /// Map a luminance sample to its glyph. Never panics.
    #[inline]
    #[must_use]
    pub fn quantize(&self, luminance: i32) -> char {
        self.glyphs[self.quantize_index(luminance)]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            glyphs: PALETTE_DEFAULT.chars().collect(),
        }
    }
}
