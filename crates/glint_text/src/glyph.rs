//! Glyph metrics extraction
//!
//! Turns a rasterizer and a codepoint list into uniform per-glyph records:
//! one grayscale bitmap plus pen-relative offsets and a horizontal advance,
//! all derived from a single pixel-scale factor so every glyph and the
//! global metrics agree.

use crate::raster::Rasterizer;
use glint_core::{Image, PixelFormat};

/// SDF bitmaps are grown by this many pixels on every side
pub const SDF_CHAR_PADDING: u32 = 4;
/// SDF value of a pixel exactly on the outline
pub const SDF_ON_EDGE_VALUE: u8 = 128;
/// SDF value change per pixel of distance from the outline
pub const SDF_PIXEL_DIST_SCALE: f32 = 64.0;

/// Coverage cutoff for two-level bitmap fonts
const BITMAP_ALPHA_THRESHOLD: u8 = 80;

/// First codepoint of the default set: ' '
pub const DEFAULT_FIRST_CODEPOINT: u32 = 32;
/// Size of the default set: ASCII 32..=126
pub const DEFAULT_CODEPOINT_COUNT: u32 = 95;

/// How glyph bitmaps are generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Two-level mask, anti-aliasing thresholded away
    Bitmap,
    /// Anti-aliased coverage
    #[default]
    Alpha,
    /// Signed distance field
    Sdf,
}

/// One extracted glyph: bitmap, placement offsets, and advance
#[derive(Debug, Clone, Default)]
pub struct GlyphData {
    /// Unicode codepoint this glyph renders
    pub value: u32,
    /// Grayscale bitmap; may be empty for glyphs with no visible shape
    pub image: Image,
    /// Horizontal offset from the pen position to the bitmap's left edge
    pub offset_x: i32,
    /// Vertical offset from the line top to the bitmap's top edge
    /// (baseline-adjusted so all glyphs share one vertical origin)
    pub offset_y: i32,
    /// Horizontal advance to the next pen position, in pixels
    pub advance_x: i32,
}

/// The default codepoint set: 95 consecutive codepoints starting at space
pub fn default_codepoints() -> Vec<u32> {
    (0..DEFAULT_CODEPOINT_COUNT)
        .map(|i| i + DEFAULT_FIRST_CODEPOINT)
        .collect()
}

/// Extract one [`GlyphData`] per requested codepoint.
///
/// `font_size` is the pixel height metrics are generated at; the same scale
/// factor is applied to every glyph and to the font's ascent. When
/// `codepoints` is `None` the default ASCII set is used.
pub fn load_glyph_data(
    rasterizer: &mut dyn Rasterizer,
    font_size: i32,
    codepoints: Option<&[u32]>,
    mode: RenderMode,
) -> Vec<GlyphData> {
    let default_set;
    let codepoints = match codepoints {
        Some(list) if !list.is_empty() => list,
        _ => {
            default_set = default_codepoints();
            &default_set
        }
    };

    let scale = rasterizer.scale_for_pixel_height(font_size as f32);
    let metrics = rasterizer.vertical_metrics();
    // Shifting every glyph down by the scaled ascent moves the common origin
    // from the baseline to the top of the line
    let baseline_shift = (metrics.ascent as f32 * scale) as i32;

    let mut glyphs = Vec::with_capacity(codepoints.len());
    for &value in codepoints {
        let rendered = match mode {
            // An SDF of whitespace is meaningless
            RenderMode::Sdf if value == ' ' as u32 => None,
            RenderMode::Sdf => rasterizer.codepoint_sdf(
                scale,
                value,
                SDF_CHAR_PADDING,
                SDF_ON_EDGE_VALUE,
                SDF_PIXEL_DIST_SCALE,
            ),
            RenderMode::Bitmap | RenderMode::Alpha => rasterizer.codepoint_bitmap(scale, value),
        };

        let mut glyph = match rendered {
            Some(mut rendered) => {
                if mode == RenderMode::Bitmap {
                    // Collapse anti-aliased edges to a clean two-level mask
                    for pixel in &mut rendered.bitmap {
                        *pixel = if *pixel < BITMAP_ALPHA_THRESHOLD { 0 } else { 255 };
                    }
                }
                GlyphData {
                    value,
                    image: Image::from_pixels(
                        rendered.bitmap,
                        rendered.width,
                        rendered.height,
                        PixelFormat::Grayscale,
                    ),
                    offset_x: rendered.offset_x,
                    offset_y: rendered.offset_y,
                    advance_x: 0,
                }
            }
            None => GlyphData {
                value,
                image: Image::empty(),
                ..GlyphData::default()
            },
        };

        glyph.offset_y += baseline_shift;
        glyph.advance_x = (rasterizer.horizontal_advance(value) as f32 * scale) as i32;
        glyphs.push(glyph);
    }

    glyphs
}
