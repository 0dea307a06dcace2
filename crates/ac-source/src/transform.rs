use ac_core::frame::{Frame, PixelLayout, bt601};
use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer as FirResizer};
use image::{ImageBuffer, Luma, Pixel, Rgb, Rgba};

use crate::error::SourceError;

fn pixel_type(layout: PixelLayout) -> PixelType {
    match layout {
        PixelLayout::Luma => PixelType::U8,
        PixelLayout::Rgb => PixelType::U8x3,
        PixelLayout::Rgba => PixelType::U8x4,
    }
}

/// Resizer réutilisable wrappant fast_image_resize, filtre Box (moyenne de zone).
///
/// # Example
/// ```
/// use ac_source::transform::Resizer;
/// use ac_core::frame::{Frame, PixelLayout};
/// let mut r = Resizer::new();
/// let src = Frame::filled(64, 48, PixelLayout::Rgb, 200);
/// let dst = r.resize(&src, 8, 3).unwrap();
/// assert_eq!((dst.width(), dst.height()), (8, 3));
/// assert_eq!(dst.layout(), PixelLayout::Rgb);
/// ```
pub struct Resizer {
    inner: FirResizer,
    options: ResizeOptions,
    /// Copie de la source : l'API from_slice_u8 exige un &mut.
    src_buf: Vec<u8>,
}

impl Resizer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: FirResizer::new(),
            options: ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Box)),
            src_buf: Vec::new(),
        }
    }

    /// Resize `src` to exactly `width × height`, keeping its pixel layout.
    ///
    /// # Errors
    /// Returns [`SourceError::Transform`] if either size is zero or the
    /// resize library rejects the buffers.
    pub fn resize(&mut self, src: &Frame, width: u32, height: u32) -> Result<Frame, SourceError> {
        if src.is_empty() || width == 0 || height == 0 {
            return Err(SourceError::Transform(format!(
                "dimensions nulles : {}×{} → {width}×{height}",
                src.width(),
                src.height()
            )));
        }
        if src.width() == width && src.height() == height {
            return Ok(src.clone());
        }

        let pt = pixel_type(src.layout());
        self.src_buf.clear();
        self.src_buf.extend_from_slice(src.data());

        let src_image = Image::from_slice_u8(src.width(), src.height(), &mut self.src_buf, pt)
            .map_err(|e| SourceError::Transform(format!("source invalide : {e}")))?;
        let mut dst_image = Image::new(width, height, pt);

        self.inner
            .resize(&src_image, &mut dst_image, Some(&self.options))
            .map_err(|e| SourceError::Transform(e.to_string()))?;

        Frame::new(dst_image.into_vec(), width, height, src.layout())
            .map_err(|e| SourceError::Transform(e.to_string()))
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Version luminance (Luma, BT.601) d'une frame.
///
/// # Example
/// ```
/// use ac_source::transform::to_grayscale;
/// use ac_core::frame::{Frame, PixelLayout};
/// let red = Frame::new(vec![255, 0, 0], 1, 1, PixelLayout::Rgb).unwrap();
/// assert_eq!(to_grayscale(&red).data(), &[76]);
/// ```
#[must_use]
pub fn to_grayscale(frame: &Frame) -> Frame {
    let bpp = frame.layout().channels();
    let data = match frame.layout() {
        PixelLayout::Luma => frame.data().to_vec(),
        PixelLayout::Rgb | PixelLayout::Rgba => frame
            .data()
            .chunks_exact(bpp)
            .map(|px| bt601(px[0], px[1], px[2]))
            .collect(),
    };
    rebuild(frame, data, PixelLayout::Luma)
}

/// Version RGB d'une frame. Luma est répliquée sur les trois canaux, l'alpha est retiré.
///
/// # Example
/// ```
/// use ac_source::transform::to_rgb;
/// use ac_core::frame::{Frame, PixelLayout};
/// let gray = Frame::new(vec![9], 1, 1, PixelLayout::Luma).unwrap();
/// assert_eq!(to_rgb(&gray).data(), &[9, 9, 9]);
/// ```
#[must_use]
pub fn to_rgb(frame: &Frame) -> Frame {
    let data = match frame.layout() {
        PixelLayout::Rgb => frame.data().to_vec(),
        PixelLayout::Luma => frame.data().iter().flat_map(|&l| [l, l, l]).collect(),
        PixelLayout::Rgba => frame
            .data()
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect(),
    };
    rebuild(frame, data, PixelLayout::Rgb)
}

/// Miroir horizontal (gauche ↔ droite), effet « selfie ».
///
/// # Example
/// ```
/// use ac_source::transform::flip_horizontal;
/// use ac_core::frame::{Frame, PixelLayout};
/// let frame = Frame::new(vec![1, 2, 3], 3, 1, PixelLayout::Luma).unwrap();
/// assert_eq!(flip_horizontal(&frame).data(), &[3, 2, 1]);
/// ```
#[must_use]
pub fn flip_horizontal(frame: &Frame) -> Frame {
    let flipped = match frame.layout() {
        PixelLayout::Luma => flip_buffer::<Luma<u8>>(frame),
        PixelLayout::Rgb => flip_buffer::<Rgb<u8>>(frame),
        PixelLayout::Rgba => flip_buffer::<Rgba<u8>>(frame),
    };
    match flipped {
        Some(data) => rebuild(frame, data, frame.layout()),
        // Unreachable for a Frame built through Frame::new; keep the input.
        None => frame.clone(),
    }
}

fn flip_buffer<P>(frame: &Frame) -> Option<Vec<u8>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let view = ImageBuffer::<P, &[u8]>::from_raw(frame.width(), frame.height(), frame.data())?;
    Some(image::imageops::flip_horizontal(&view).into_raw())
}

/// Les transformations conservent les dimensions ; seule la taille du buffer change.
fn rebuild(frame: &Frame, data: Vec<u8>, layout: PixelLayout) -> Frame {
    Frame::new(data, frame.width(), frame.height(), layout)
        .unwrap_or_else(|_| Frame::filled(frame.width(), frame.height(), layout, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_rgb_3x2() {
        // Row 0: A B C, Row 1: D E F
        let frame = Frame::new(
            vec![
                1, 1, 1, 2, 2, 2, 3, 3, 3, //
                4, 4, 4, 5, 5, 5, 6, 6, 6,
            ],
            3,
            2,
            PixelLayout::Rgb,
        )
        .unwrap();
        let flipped = flip_horizontal(&frame);
        assert_eq!(
            flipped.data(),
            &[
                3, 3, 3, 2, 2, 2, 1, 1, 1, //
                6, 6, 6, 5, 5, 5, 4, 4, 4,
            ]
        );
    }

    #[test]
    fn flip_keeps_channel_order() {
        let frame = Frame::new(vec![1, 2, 3, 4, 5, 6], 2, 1, PixelLayout::Rgb).unwrap();
        assert_eq!(flip_horizontal(&frame).data(), &[4, 5, 6, 1, 2, 3]);
    }

    #[test]
    fn flip_twice_is_identity() {
        let data: Vec<u8> = (0..5 * 4 * 4).map(|i| i as u8).collect();
        let frame = Frame::new(data, 5, 4, PixelLayout::Rgba).unwrap();
        assert_eq!(flip_horizontal(&flip_horizontal(&frame)), frame);
    }

    #[test]
    fn flip_leaves_input_untouched() {
        let frame = Frame::new(vec![1, 2], 2, 1, PixelLayout::Luma).unwrap();
        let _ = flip_horizontal(&frame);
        assert_eq!(frame.data(), &[1, 2]);
    }

    #[test]
    fn grayscale_of_rgba_ignores_alpha() {
        let frame = Frame::new(vec![255, 255, 255, 0], 1, 1, PixelLayout::Rgba).unwrap();
        let gray = to_grayscale(&frame);
        assert_eq!(gray.layout(), PixelLayout::Luma);
        assert_eq!(gray.data(), &[255]);
    }

    #[test]
    fn rgb_of_rgba_drops_alpha() {
        let frame = Frame::new(vec![1, 2, 3, 4, 5, 6, 7, 8], 2, 1, PixelLayout::Rgba).unwrap();
        assert_eq!(to_rgb(&frame).data(), &[1, 2, 3, 5, 6, 7]);
    }

    #[test]
    fn resize_exact_dimensions_each_layout() {
        for layout in [PixelLayout::Luma, PixelLayout::Rgb, PixelLayout::Rgba] {
            let src = Frame::filled(640, 480, layout, 0);
            let dst = Resizer::new().resize(&src, 120, 45).unwrap();
            assert_eq!(dst.width(), 120);
            assert_eq!(dst.height(), 45);
            assert_eq!(dst.layout(), layout);
            assert_eq!(dst.data().len(), 120 * 45 * layout.channels());
        }
    }

    #[test]
    fn resize_averages_area() {
        // 2×1 luma [0, 200] → 1×1 ≈ 100
        let src = Frame::new(vec![0, 200], 2, 1, PixelLayout::Luma).unwrap();
        let dst = Resizer::new().resize(&src, 1, 1).unwrap();
        let v = dst.data()[0];
        assert!((95..=105).contains(&v), "moyenne attendue ~100, obtenu {v}");
    }

    #[test]
    fn resize_rejects_zero_sizes() {
        let mut resizer = Resizer::new();
        let src = Frame::filled(4, 4, PixelLayout::Rgb, 0);
        assert!(matches!(resizer.resize(&src, 0, 2), Err(SourceError::Transform(_))));
        let empty = Frame::filled(0, 4, PixelLayout::Rgb, 0);
        assert!(matches!(resizer.resize(&empty, 2, 2), Err(SourceError::Transform(_))));
    }

    #[test]
    fn resizer_is_reusable_across_sizes() {
        let mut resizer = Resizer::new();
        let big = Frame::filled(640, 480, PixelLayout::Rgb, 0);
        let small = Frame::filled(64, 48, PixelLayout::Luma, 0);
        for _ in 0..2 {
            assert_eq!(resizer.resize(&big, 100, 38).unwrap().width(), 100);
            assert_eq!(resizer.resize(&small, 8, 3).unwrap().layout(), PixelLayout::Luma);
        }
    }
}
