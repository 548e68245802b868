//! Glyph rasterization
//!
//! [`Rasterizer`] is the interface the extractor consumes: per-codepoint
//! bitmaps (coverage or SDF), global vertical metrics, and raw advances.
//! [`OutlineRasterizer`] is the production implementation, parsing fonts
//! with ttf-parser and rendering outlines with swash.

use crate::{Result, TextError};
use swash::scale::{Render, ScaleContext, Source};
use swash::zeno::Format;

/// One rasterized glyph bitmap with its placement relative to the pen origin
#[derive(Debug, Clone)]
pub struct RasterizedGlyph {
    /// Single-channel pixels (coverage, or distance values in SDF mode)
    pub bitmap: Vec<u8>,
    /// Bitmap width in pixels
    pub width: u32,
    /// Bitmap height in pixels
    pub height: u32,
    /// Horizontal offset from the pen origin to the bitmap's left edge
    pub offset_x: i32,
    /// Vertical offset from the baseline down to the bitmap's top edge
    /// (negative for glyphs rising above the baseline, as most do)
    pub offset_y: i32,
}

/// Global vertical font metrics in unscaled font units
#[derive(Debug, Clone, Copy)]
pub struct VerticalMetrics {
    pub ascent: i32,
    pub descent: i32,
    pub line_gap: i32,
}

/// Produces glyph bitmaps and metrics for a single font face
pub trait Rasterizer {
    /// Factor converting font units to pixels for the given pixel height
    fn scale_for_pixel_height(&self, pixel_height: f32) -> f32;

    /// Ascent, descent, and line gap in font units
    fn vertical_metrics(&self) -> VerticalMetrics;

    /// Render the anti-aliased coverage bitmap of a codepoint.
    ///
    /// Returns `None` when the codepoint has no visible shape (whitespace,
    /// or a glyph missing from the face).
    fn codepoint_bitmap(&mut self, scale: f32, codepoint: u32) -> Option<RasterizedGlyph>;

    /// Render a signed-distance-field bitmap of a codepoint.
    ///
    /// `padding` extends the bitmap on every side so the field has room to
    /// fall off; a pixel exactly on the outline gets `on_edge_value`, and
    /// each pixel of distance shifts the value by `pixel_dist_scale`.
    fn codepoint_sdf(
        &mut self,
        scale: f32,
        codepoint: u32,
        padding: u32,
        on_edge_value: u8,
        pixel_dist_scale: f32,
    ) -> Option<RasterizedGlyph>;

    /// Horizontal advance of a codepoint in unscaled font units
    fn horizontal_advance(&self, codepoint: u32) -> i32;
}

/// Production rasterizer backed by ttf-parser (metrics) and swash (rendering)
pub struct OutlineRasterizer {
    data: Vec<u8>,
    scale_context: ScaleContext,
    units_per_em: u16,
    metrics: VerticalMetrics,
}

impl OutlineRasterizer {
    /// Initialize from raw TTF/OTF bytes.
    ///
    /// Fails when neither parser accepts the data; the caller must treat the
    /// font as unusable.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|e| TextError::FontParseError(e.to_string()))?;
        let metrics = VerticalMetrics {
            ascent: face.ascender() as i32,
            descent: face.descender() as i32,
            line_gap: face.line_gap() as i32,
        };
        let units_per_em = face.units_per_em();

        if swash::FontRef::from_index(&data, 0).is_none() {
            return Err(TextError::InvalidFontData);
        }

        Ok(Self {
            data,
            scale_context: ScaleContext::new(),
            units_per_em,
            metrics,
        })
    }

    fn font_ref(&self) -> Option<swash::FontRef<'_>> {
        swash::FontRef::from_index(&self.data, 0)
    }

    fn render_coverage(&mut self, scale: f32, codepoint: u32) -> Option<RasterizedGlyph> {
        let font = swash::FontRef::from_index(&self.data, 0)?;
        let glyph_id = font.charmap().map(codepoint);

        // swash sizes are pixels per em; the extractor hands us a
        // font-unit-to-pixel factor
        let size = scale * self.units_per_em as f32;
        let mut scaler = self.scale_context.builder(font).size(size).build();

        let mut render = Render::new(&[Source::Outline]);
        render.format(Format::Alpha);
        let image = render.render(&mut scaler, glyph_id)?;

        if image.placement.width == 0 || image.placement.height == 0 {
            return None;
        }

        Some(RasterizedGlyph {
            bitmap: image.data,
            width: image.placement.width,
            height: image.placement.height,
            offset_x: image.placement.left,
            // swash reports the top edge upward from the baseline; placement
            // offsets grow downward
            offset_y: -image.placement.top,
        })
    }
}

impl Rasterizer for OutlineRasterizer {
    fn scale_for_pixel_height(&self, pixel_height: f32) -> f32 {
        pixel_height / (self.metrics.ascent - self.metrics.descent) as f32
    }

    fn vertical_metrics(&self) -> VerticalMetrics {
        self.metrics
    }

    fn codepoint_bitmap(&mut self, scale: f32, codepoint: u32) -> Option<RasterizedGlyph> {
        self.render_coverage(scale, codepoint)
    }

    fn codepoint_sdf(
        &mut self,
        scale: f32,
        codepoint: u32,
        padding: u32,
        on_edge_value: u8,
        pixel_dist_scale: f32,
    ) -> Option<RasterizedGlyph> {
        let coverage = self.render_coverage(scale, codepoint)?;
        Some(distance_field(
            &coverage,
            padding,
            on_edge_value,
            pixel_dist_scale,
        ))
    }

    fn horizontal_advance(&self, codepoint: u32) -> i32 {
        let Some(font) = self.font_ref() else {
            return 0;
        };
        let glyph_id = font.charmap().map(codepoint);
        font.glyph_metrics(&[]).advance_width(glyph_id).round() as i32
    }
}

/// Coverage cutoff separating "inside the outline" from "outside"
const SDF_INSIDE_THRESHOLD: u8 = 128;

/// Build a signed distance field from a rendered coverage mask.
///
/// The output is the input grown by `padding` on every side. Each pixel
/// holds `on_edge_value` shifted by its distance (in pixels, scaled by
/// `pixel_dist_scale`) to the nearest opposite-side pixel: above for inside
/// pixels, below for outside ones, clamped to the byte range. Distances are
/// found by direct search in a window of `padding + 1` pixels, which covers
/// every distance the byte range can represent at the default scale.
fn distance_field(
    coverage: &RasterizedGlyph,
    padding: u32,
    on_edge_value: u8,
    pixel_dist_scale: f32,
) -> RasterizedGlyph {
    let src_w = coverage.width as i32;
    let src_h = coverage.height as i32;
    let pad = padding as i32;
    let out_w = src_w + 2 * pad;
    let out_h = src_h + 2 * pad;

    let inside_at = |x: i32, y: i32| -> bool {
        if x < 0 || y < 0 || x >= src_w || y >= src_h {
            return false;
        }
        coverage.bitmap[(y * src_w + x) as usize] >= SDF_INSIDE_THRESHOLD
    };

    let radius = pad + 1;
    let mut bitmap = vec![0u8; (out_w * out_h) as usize];
    for oy in 0..out_h {
        for ox in 0..out_w {
            let sx = ox - pad;
            let sy = oy - pad;
            let inside = inside_at(sx, sy);

            // Distance to the nearest pixel on the other side of the outline
            let mut nearest_sq = (radius * radius) as f32;
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    if inside_at(sx + dx, sy + dy) != inside {
                        let dist_sq = (dx * dx + dy * dy) as f32;
                        if dist_sq < nearest_sq {
                            nearest_sq = dist_sq;
                        }
                    }
                }
            }

            let dist = nearest_sq.sqrt();
            let signed = if inside { dist } else { -dist };
            let value = on_edge_value as f32 + signed * pixel_dist_scale;
            bitmap[(oy * out_w + ox) as usize] = value.clamp(0.0, 255.0) as u8;
        }
    }

    RasterizedGlyph {
        bitmap,
        width: out_w as u32,
        height: out_h as u32,
        offset_x: coverage.offset_x - pad,
        offset_y: coverage.offset_y - pad,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_square(side: u32) -> RasterizedGlyph {
        RasterizedGlyph {
            bitmap: vec![255; (side * side) as usize],
            width: side,
            height: side,
            offset_x: 1,
            offset_y: -(side as i32),
        }
    }

    #[test]
    fn test_distance_field_dimensions_and_offsets() {
        let sdf = distance_field(&solid_square(6), 4, 128, 64.0);
        assert_eq!(sdf.width, 14);
        assert_eq!(sdf.height, 14);
        assert_eq!(sdf.offset_x, -3);
        assert_eq!(sdf.offset_y, -10);
    }

    #[test]
    fn test_distance_field_sign_convention() {
        let sdf = distance_field(&solid_square(8), 4, 128, 64.0);
        let w = sdf.width as usize;

        // Center of the square: well inside, above the edge value
        let center = sdf.bitmap[(4 + 4) * w + (4 + 4)];
        assert!(center > 128, "center {center}");

        // Outer corner: well outside, clamped toward zero
        let corner = sdf.bitmap[0];
        assert!(corner < 128, "corner {corner}");

        // First pixel inside the boundary sits one step above the edge value
        let boundary = sdf.bitmap[4 * w + 4];
        assert!(boundary >= 128, "boundary {boundary}");
        assert!(boundary <= 192, "boundary {boundary}");
    }

    #[test]
    fn test_distance_field_of_empty_coverage_is_outside() {
        let empty = RasterizedGlyph {
            bitmap: Vec::new(),
            width: 0,
            height: 0,
            offset_x: 0,
            offset_y: 0,
        };
        let sdf = distance_field(&empty, 2, 128, 64.0);
        assert_eq!(sdf.width, 4);
        assert!(sdf.bitmap.iter().all(|&v| v < 128));
    }
}
