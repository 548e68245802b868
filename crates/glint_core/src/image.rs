//! CPU-side bitmap type
//!
//! `Image` is a plain owned 2D pixel buffer. It is the interchange type
//! between glyph rasterization, atlas packing, and texture upload.

use crate::geometry::Rect;

/// Pixel layout of an [`Image`] buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// One byte per pixel: intensity
    #[default]
    Grayscale,
    /// Two bytes per pixel: intensity + alpha
    GrayAlpha,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Grayscale => 1,
            PixelFormat::GrayAlpha => 2,
        }
    }
}

/// An owned 2D pixel buffer
#[derive(Debug, Clone, Default)]
pub struct Image {
    /// Raw pixel data, row-major, tightly packed
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Mipmap levels present in `data` (always 1 for CPU-built images)
    pub mipmaps: u32,
    /// Pixel layout of `data`
    pub format: PixelFormat,
}

impl Image {
    /// Create a zero-filled image
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            data: vec![0; width as usize * height as usize * format.bytes_per_pixel()],
            width,
            height,
            mipmaps: 1,
            format,
        }
    }

    /// Create an image from an existing pixel buffer
    pub fn from_pixels(data: Vec<u8>, width: u32, height: u32, format: PixelFormat) -> Self {
        debug_assert_eq!(
            data.len(),
            width as usize * height as usize * format.bytes_per_pixel()
        );
        Self {
            data,
            width,
            height,
            mipmaps: 1,
            format,
        }
    }

    /// An image with no pixels (used for glyphs that have no visible shape)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Copy a sub-rectangle of `source` into a new owned image.
    ///
    /// The rectangle is clamped to the source bounds; a fully out-of-bounds
    /// or degenerate rectangle yields an empty image.
    pub fn from_image(source: &Image, rect: Rect) -> Image {
        let x = rect.x.max(0.0) as u32;
        let y = rect.y.max(0.0) as u32;
        if rect.is_degenerate() || x >= source.width || y >= source.height {
            return Image::empty();
        }

        let mut width = rect.width as u32;
        let mut height = rect.height as u32;
        if x + width > source.width || y + height > source.height {
            tracing::warn!(
                "crop rectangle out of bounds, clamping to {}x{}",
                source.width,
                source.height
            );
            width = width.min(source.width - x);
            height = height.min(source.height - y);
        }

        let bpp = source.format.bytes_per_pixel();
        let mut out = Image::new(width, height, source.format);
        for row in 0..height as usize {
            let src_start = ((y as usize + row) * source.width as usize + x as usize) * bpp;
            let dst_start = row * width as usize * bpp;
            let count = width as usize * bpp;
            out.data[dst_start..dst_start + count]
                .copy_from_slice(&source.data[src_start..src_start + count]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_image(width: u32, height: u32) -> Image {
        let data = (0..width * height).map(|i| i as u8).collect();
        Image::from_pixels(data, width, height, PixelFormat::Grayscale)
    }

    #[test]
    fn test_crop_copies_expected_pixels() {
        let src = gradient_image(8, 8);
        let out = Image::from_image(&src, Rect::new(2.0, 1.0, 3.0, 2.0));

        assert_eq!(out.width, 3);
        assert_eq!(out.height, 2);
        // Row 1 starts at 8, +2 columns = 10
        assert_eq!(out.data, vec![10, 11, 12, 18, 19, 20]);
    }

    #[test]
    fn test_crop_clamps_to_bounds() {
        let src = gradient_image(4, 4);
        let out = Image::from_image(&src, Rect::new(2.0, 2.0, 10.0, 10.0));
        assert_eq!(out.width, 2);
        assert_eq!(out.height, 2);
    }

    #[test]
    fn test_crop_degenerate_rect_is_empty() {
        let src = gradient_image(4, 4);
        assert!(Image::from_image(&src, Rect::ZERO).is_empty());
        assert!(Image::from_image(&src, Rect::new(9.0, 9.0, 2.0, 2.0)).is_empty());
    }

    #[test]
    fn test_gray_alpha_crop_preserves_format() {
        let data = vec![255u8; 4 * 4 * 2];
        let src = Image::from_pixels(data, 4, 4, PixelFormat::GrayAlpha);
        let out = Image::from_image(&src, Rect::new(0.0, 0.0, 2.0, 2.0));
        assert_eq!(out.format, PixelFormat::GrayAlpha);
        assert_eq!(out.data.len(), 2 * 2 * 2);
    }
}
