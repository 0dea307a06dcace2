use crate::error::CoreError;

/// Layout des pixels d'une [`Frame`].
///
/// # Example
/// ```
/// use ac_core::frame::PixelLayout;
/// assert_eq!(PixelLayout::Rgb.channels(), 3);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    /// One luminance byte per pixel.
    Luma,
    /// Red, green, blue.
    Rgb,
    /// Red, green, blue, alpha. Alpha is ignored by every consumer.
    Rgba,
}

impl PixelLayout {
    /// Bytes per pixel.
    #[inline]
    #[must_use]
    pub fn channels(self) -> usize {
        match self {
            Self::Luma => 1,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Frame raster immuable, row-major, sans padding.
///
/// Les transformations (resize, conversion, miroir) produisent une
/// nouvelle frame ; aucune n'est modifiée en place par le pipeline.
///
/// # Example
/// ```
/// use ac_core::frame::{Frame, PixelLayout};
/// let frame = Frame::filled(4, 2, PixelLayout::Rgb, 10);
/// assert_eq!(frame.data().len(), 4 * 2 * 3);
/// assert_eq!(frame.rgb(3, 1), (10, 10, 10));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    layout: PixelLayout,
}

impl Frame {
    /// Wrap an existing pixel buffer.
    ///
    /// Zero dimensions are accepted here (an empty buffer is consistent);
    /// the renderer is the one rejecting them.
    ///
    /// # Errors
    /// Returns [`CoreError::BufferSize`] if `data.len()` is not
    /// `width × height × channels`.
    ///
    /// # Example
    /// ```
    /// use ac_core::frame::{Frame, PixelLayout};
    /// assert!(Frame::new(vec![0; 6], 2, 1, PixelLayout::Rgb).is_ok());
    /// assert!(Frame::new(vec![0; 5], 2, 1, PixelLayout::Rgb).is_err());
    /// ```
    pub fn new(data: Vec<u8>, width: u32, height: u32, layout: PixelLayout) -> Result<Self, CoreError> {
        let expected = width as usize * height as usize * layout.channels();
        if data.len() != expected {
            return Err(CoreError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            layout,
        })
    }

    /// Frame uniforme, chaque octet vaut `value`.
    #[must_use]
    pub fn filled(width: u32, height: u32, layout: PixelLayout, value: u8) -> Self {
        Self {
            data: vec![value; width as usize * height as usize * layout.channels()],
            width,
            height,
            layout,
        }
    }

    /// Width in pixels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    #[must_use]
    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    /// Raw bytes, row-major.
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// `true` si l'une des dimensions est nulle.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Composantes (r, g, b) du pixel (x, y). Une frame Luma renvoie (l, l, l).
    ///
    /// # Example
    /// ```
    /// use ac_core::frame::{Frame, PixelLayout};
    /// let frame = Frame::new(vec![7, 9], 2, 1, PixelLayout::Luma).unwrap();
    /// assert_eq!(frame.rgb(1, 0), (9, 9, 9));
    /// ```
    #[inline]
    #[must_use]
    pub fn rgb(&self, x: u32, y: u32) -> (u8, u8, u8) {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let bpp = self.layout.channels();
        let idx = (y as usize * self.width as usize + x as usize) * bpp;
        let Some(px) = self.data.get(idx..idx + bpp) else {
            return (0, 0, 0);
        };
        match self.layout {
            PixelLayout::Luma => (px[0], px[0], px[0]),
            PixelLayout::Rgb | PixelLayout::Rgba => (px[0], px[1], px[2]),
        }
    }

    /// Luminance ITU-R BT.601 du pixel (x, y), en arithmétique entière.
    ///
    /// Pour une frame Luma, la valeur stockée est renvoyée telle quelle.
    ///
    /// # Example
    /// ```
    /// use ac_core::frame::{Frame, PixelLayout};
    /// let white = Frame::filled(1, 1, PixelLayout::Rgb, 255);
    /// assert_eq!(white.luminance(0, 0), 255);
    /// ```
    #[inline]
    #[must_use]
    pub fn luminance(&self, x: u32, y: u32) -> u8 {
        if self.layout == PixelLayout::Luma {
            let idx = y as usize * self.width as usize + x as usize;
            return self.data.get(idx).copied().unwrap_or(0);
        }
        let (r, g, b) = self.rgb(x, y);
        bt601(r, g, b)
    }
}

/// Y = 0.299 R + 0.587 G + 0.114 B, coefficients scaled by 1000.
#[inline]
#[must_use]
pub fn bt601(r: u8, g: u8, b: u8) -> u8 {
    ((299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b)) / 1000) as u8
}
