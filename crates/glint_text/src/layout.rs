//! Text measurement and draw layout
//!
//! Walks a byte string as a codepoint stream over an assembled [`Font`] and
//! produces either a bounding size or per-glyph draw commands. Both passes
//! share one advance computation, so a measured string and its drawn quads
//! agree exactly.
//!
//! Line height is fixed at 1.5x the font's base size; a newline resets the
//! horizontal pen and advances the vertical pen by one line height.

use crate::codepoint::codepoints;
use crate::font::{Font, Glyph};
use glint_core::{Rect, Vec2};

/// Fixed line height as a multiple of the font's base size
const LINE_HEIGHT_FACTOR: f32 = 1.5;

/// One glyph draw command: blit `source` from the atlas texture to `dest`
#[derive(Debug, Clone, Copy)]
pub struct GlyphQuad {
    /// Source rectangle within the font's atlas texture, in texels
    pub source: Rect,
    /// Destination rectangle in target space, in pixels
    pub dest: Rect,
}

/// Pen advance of one glyph at base scale.
///
/// Glyphs without an advance (image-only fonts) fall back to their placement
/// width plus horizontal offset. Measurement and draw layout both go through
/// here; the two must never diverge.
fn glyph_advance(glyph: &Glyph) -> f32 {
    if glyph.info.advance_x != 0 {
        glyph.info.advance_x as f32
    } else {
        glyph.source.width + glyph.info.offset_x as f32
    }
}

/// Measure the bounding size of `text` at `font_size`.
///
/// `spacing` is extra space inserted after every glyph; it contributes
/// `(count - 1) * spacing` to the width of the widest line.
pub fn measure_text(font: &Font, text: &str, font_size: f32, spacing: f32) -> Vec2 {
    measure_text_bytes(font, text.as_bytes(), font_size, spacing)
}

/// [`measure_text`] over a raw byte string.
///
/// Undecodable bytes measure as the replacement glyph, one byte at a time,
/// exactly as [`layout_text_bytes`] draws them.
pub fn measure_text_bytes(font: &Font, text: &[u8], font_size: f32, spacing: f32) -> Vec2 {
    let scale = font_size / font.base_size() as f32;
    let line_height = font.base_size() as f32 * LINE_HEIGHT_FACTOR;

    let mut widest_width = 0.0f32;
    let mut widest_count = 0usize;
    let mut line_width = 0.0f32;
    let mut line_count = 0usize;
    let mut height = line_height;

    for code in codepoints(text) {
        if code == '\n' as u32 {
            if line_width > widest_width {
                widest_width = line_width;
                widest_count = line_count;
            }
            line_width = 0.0;
            line_count = 0;
            height += line_height;
            continue;
        }
        line_width += glyph_advance(&font.glyphs()[font.glyph_index(code)]);
        line_count += 1;
    }
    if line_width > widest_width {
        widest_width = line_width;
        widest_count = line_count;
    }

    Vec2 {
        x: widest_width * scale + widest_count.saturating_sub(1) as f32 * spacing,
        y: height * scale,
    }
}

/// Lay out `text` for drawing at `position`, emitting one [`GlyphQuad`] per
/// visible glyph (spaces and tabs advance the pen but emit nothing).
pub fn layout_text(
    font: &Font,
    text: &str,
    position: Vec2,
    font_size: f32,
    spacing: f32,
) -> Vec<GlyphQuad> {
    layout_text_bytes(font, text.as_bytes(), position, font_size, spacing)
}

/// [`layout_text`] over a raw byte string.
///
/// Every undecodable byte is drawn as the replacement glyph rather than
/// skipped, matching the measurement walk byte for byte.
pub fn layout_text_bytes(
    font: &Font,
    text: &[u8],
    position: Vec2,
    font_size: f32,
    spacing: f32,
) -> Vec<GlyphQuad> {
    let scale = font_size / font.base_size() as f32;
    let line_height = font.base_size() as f32 * LINE_HEIGHT_FACTOR;

    let mut quads = Vec::new();
    let mut pen_x = 0.0f32;
    let mut pen_y = 0.0f32;

    for code in codepoints(text) {
        if code == '\n' as u32 {
            pen_x = 0.0;
            pen_y += line_height * scale;
            continue;
        }

        let glyph = &font.glyphs()[font.glyph_index(code)];
        if code != ' ' as u32 && code != '\t' as u32 && !glyph.source.is_degenerate() {
            quads.push(GlyphQuad {
                source: glyph.source,
                dest: Rect::new(
                    position.x + pen_x + glyph.info.offset_x as f32 * scale,
                    position.y + pen_y + glyph.info.offset_y as f32 * scale,
                    glyph.source.width * scale,
                    glyph.source.height * scale,
                ),
            });
        }

        pen_x += glyph_advance(glyph) * scale + spacing;
    }

    quads
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::testing::{FakeRasterizer, RecordingUploader};
    use crate::font::FontLoadOptions;

    fn test_font() -> Font {
        let mut uploader = RecordingUploader::default();
        Font::from_rasterizer(
            &mut FakeRasterizer,
            FontLoadOptions::default(),
            &mut uploader,
        )
        .expect("assembly succeeds")
    }

    /// FakeRasterizer advances every glyph 500 font units = 16 px at base 32
    const ADVANCE: f32 = 16.0;

    #[test]
    fn test_measure_single_line_width() {
        let font = test_font();
        let size = measure_text(&font, "World", 32.0, 0.0);
        assert_eq!(size.x, 5.0 * ADVANCE);
        assert_eq!(size.y, 48.0); // one 1.5x line
    }

    #[test]
    fn test_measure_two_lines() {
        let font = test_font();
        let size = measure_text(&font, "Hi\nWorld", 32.0, 0.0);

        // Two line heights, no trailing blank line
        assert_eq!(size.y, 1.5 * 32.0 * 2.0);
        // Width comes from the wider second line
        assert_eq!(size.x, 5.0 * ADVANCE);
    }

    #[test]
    fn test_measure_scales_with_font_size() {
        let font = test_font();
        let base = measure_text(&font, "Hi\nWorld", 32.0, 0.0);
        let doubled = measure_text(&font, "Hi\nWorld", 64.0, 0.0);
        assert_eq!(doubled.x, base.x * 2.0);
        assert_eq!(doubled.y, base.y * 2.0);
    }

    #[test]
    fn test_measure_spacing_counts_widest_line_glyphs() {
        let font = test_font();
        let plain = measure_text(&font, "Hi\nWorld", 32.0, 0.0);
        let spaced = measure_text(&font, "Hi\nWorld", 32.0, 3.0);
        // Widest line has 5 glyphs -> 4 gaps
        assert_eq!(spaced.x, plain.x + 4.0 * 3.0);
    }

    #[test]
    fn test_layout_emits_only_visible_glyphs() {
        let font = test_font();
        let quads = layout_text(&font, "a b\tc", Vec2::ZERO, 32.0, 0.0);
        assert_eq!(quads.len(), 3);
    }

    #[test]
    fn test_layout_pen_advances_match_measurement() {
        let font = test_font();
        let text = "Word";
        let quads = layout_text(&font, text, Vec2::ZERO, 32.0, 0.0);
        let measured = measure_text(&font, text, 32.0, 0.0);

        // Each quad starts at its pen position (offset_x is 0 in the fake
        // face); the measured width equals the last pen position plus the
        // last glyph's advance
        for (i, quad) in quads.iter().enumerate() {
            assert_eq!(quad.dest.x, i as f32 * ADVANCE);
        }
        let last = quads.last().unwrap();
        assert_eq!(measured.x, last.dest.x + ADVANCE);
    }

    #[test]
    fn test_layout_newline_resets_pen() {
        let font = test_font();
        let quads = layout_text(&font, "a\nb", Vec2::new(10.0, 20.0), 32.0, 0.0);
        assert_eq!(quads.len(), 2);

        // Both glyphs at the line start, one line height apart
        assert_eq!(quads[1].dest.x, quads[0].dest.x);
        assert_eq!(quads[1].dest.y, quads[0].dest.y + 48.0);
    }

    #[test]
    fn test_layout_applies_scale_and_position() {
        let font = test_font();
        let origin = Vec2::new(100.0, 50.0);
        let quads = layout_text(&font, "A", origin, 64.0, 0.0);
        let glyph = &font.glyphs()[font.glyph_index('A' as u32)];

        let quad = quads[0];
        assert_eq!(quad.source, glyph.source);
        assert_eq!(quad.dest.x, origin.x + glyph.info.offset_x as f32 * 2.0);
        assert_eq!(quad.dest.y, origin.y + glyph.info.offset_y as f32 * 2.0);
        assert_eq!(quad.dest.width, glyph.source.width * 2.0);
        assert_eq!(quad.dest.height, glyph.source.height * 2.0);
    }

    #[test]
    fn test_malformed_bytes_measure_and_draw_alike() {
        let font = test_font();
        // Bad second byte: surfaced as two replacement glyphs, one per byte
        let bytes = [b'a', 0xe0, 0x9f, b'b'];
        let measured = measure_text_bytes(&font, &bytes, 32.0, 0.0);
        let quads = layout_text_bytes(&font, &bytes, Vec2::ZERO, 32.0, 0.0);

        assert_eq!(quads.len(), 4);
        assert_eq!(measured.x, 4.0 * ADVANCE);
        let last = quads.last().unwrap();
        assert_eq!(measured.x, last.dest.x + ADVANCE);
    }

    #[test]
    fn test_absent_codepoint_draws_replacement_glyph() {
        let font = test_font();
        let quads = layout_text(&font, "€", Vec2::ZERO, 32.0, 0.0);
        let question = &font.glyphs()[font.glyph_index('?' as u32)];
        assert_eq!(quads[0].source, question.source);
    }

    #[test]
    fn test_empty_text_has_line_height() {
        let font = test_font();
        let size = measure_text(&font, "", 32.0, 0.0);
        assert_eq!(size.x, 0.0);
        assert_eq!(size.y, 48.0);
    }
}
