//! Font atlas generation
//!
//! Packs extracted glyph bitmaps into one square power-of-two texture and
//! records where each glyph landed. Two strategies are available: simple
//! row packing and a skyline rectangle packer with better area utilization.
//!
//! Placement rectangles always report the glyph bitmap's exact position and
//! size; the `padding` margin around each glyph is applied during packing
//! but never included in the reported rectangle.

use crate::glyph::GlyphData;
use glint_core::{Image, PixelFormat, Rect};

/// Area overestimation factor of the atlas sizing heuristic.
///
/// Deliberately generous so both packers almost always fit the whole glyph
/// set; degenerate size distributions can still overflow, in which case the
/// overflowing glyphs get degenerate rectangles.
const ATLAS_AREA_FACTOR: f32 = 1.3;

/// Packing strategy used for atlas generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackMethod {
    /// Left-to-right rows of fixed height; simple, some waste per row
    #[default]
    Rows,
    /// Bottom-left skyline packing; denser for mixed glyph sizes
    Skyline,
}

/// A generated atlas: the packed image plus one placement per input glyph
#[derive(Debug)]
pub struct FontAtlas {
    /// Square gray+alpha image, side a power of two
    pub image: Image,
    /// Placement rectangles, parallel to the input glyph order; all-zero for
    /// glyphs that could not be placed
    pub placements: Vec<Rect>,
}

/// Pack glyph bitmaps into a fresh atlas.
///
/// `font_size` sets the row height for [`PackMethod::Rows`]; `padding` is
/// the margin kept around every glyph on all sides.
pub fn gen_font_atlas(
    glyphs: &[GlyphData],
    font_size: i32,
    padding: u32,
    method: PackMethod,
) -> FontAtlas {
    let side = atlas_side(glyphs, padding);
    let mut intensity = vec![0u8; (side * side) as usize];

    let placements = match method {
        PackMethod::Rows => pack_rows(glyphs, font_size, padding, side, &mut intensity),
        PackMethod::Skyline => pack_skyline(glyphs, padding, side, &mut intensity),
    };

    // Expand to two channels: constant full intensity plus the packed
    // coverage as alpha, directly usable as a color+mask texture
    let mut data = Vec::with_capacity(intensity.len() * 2);
    for value in intensity {
        data.push(255);
        data.push(value);
    }

    FontAtlas {
        image: Image::from_pixels(data, side, side, PixelFormat::GrayAlpha),
        placements,
    }
}

/// Smallest power-of-two side whose area covers the padded glyph footprints
/// with [`ATLAS_AREA_FACTOR`] to spare
fn atlas_side(glyphs: &[GlyphData], padding: u32) -> u32 {
    let mut required_area = 0.0f32;
    for glyph in glyphs {
        required_area +=
            ((glyph.image.width + 2 * padding) * (glyph.image.height + 2 * padding)) as f32;
    }
    let guess = required_area.sqrt() * ATLAS_AREA_FACTOR;
    (guess.ceil() as u32).max(1).next_power_of_two()
}

/// Copy a single-channel glyph bitmap into the atlas at (x, y)
fn blit(intensity: &mut [u8], side: u32, image: &Image, x: u32, y: u32) {
    let width = image.width as usize;
    for row in 0..image.height as usize {
        let src = row * width;
        let dst = (y as usize + row) * side as usize + x as usize;
        intensity[dst..dst + width].copy_from_slice(&image.data[src..src + width]);
    }
}

fn pack_rows(
    glyphs: &[GlyphData],
    font_size: i32,
    padding: u32,
    side: u32,
    intensity: &mut [u8],
) -> Vec<Rect> {
    let row_height = font_size as u32 + 2 * padding;
    let mut placements = vec![Rect::ZERO; glyphs.len()];
    let mut offset_x = padding;
    let mut offset_y = padding;

    for (i, glyph) in glyphs.iter().enumerate() {
        let width = glyph.image.width;
        let height = glyph.image.height;

        // Wrap before overflowing the right edge
        if offset_x + width + padding > side {
            offset_x = padding;
            // SDF glyphs carry internal padding, so a row can be up to
            // (font_size + 2 * SDF padding) tall; the heuristic absorbs it
            offset_y += row_height;
            if offset_y + font_size as u32 + padding > side {
                // No further row fits; report the rest as unplaced
                for skipped in &glyphs[i..] {
                    tracing::warn!(codepoint = skipped.value, "atlas full, glyph not packed");
                }
                break;
            }
        }
        if offset_x + width + padding > side || offset_y + height + padding > side {
            // Bigger than the remaining space in either direction;
            // unplaceable at this atlas size
            tracing::warn!(codepoint = glyph.value, "glyph larger than atlas, not packed");
            continue;
        }

        blit(intensity, side, &glyph.image, offset_x, offset_y);
        placements[i] = Rect::new(
            offset_x as f32,
            offset_y as f32,
            width as f32,
            height as f32,
        );
        offset_x += width + 2 * padding;
    }

    placements
}

fn pack_skyline(glyphs: &[GlyphData], padding: u32, side: u32, intensity: &mut [u8]) -> Vec<Rect> {
    tracing::debug!(side, count = glyphs.len(), "skyline packing font atlas");

    let mut rects: Vec<PackRect> = glyphs
        .iter()
        .enumerate()
        .map(|(id, glyph)| PackRect::new(id, glyph.image.width + 2 * padding, glyph.image.height + 2 * padding))
        .collect();

    let mut packer = SkylinePacker::new(side, side);
    packer.pack(&mut rects);

    let mut placements = vec![Rect::ZERO; glyphs.len()];
    for rect in &rects {
        let glyph = &glyphs[rect.id];
        if !rect.was_packed {
            tracing::warn!(codepoint = glyph.value, "atlas full, glyph not packed");
            continue;
        }
        blit(
            intensity,
            side,
            &glyph.image,
            rect.x + padding,
            rect.y + padding,
        );
        placements[rect.id] = Rect::new(
            (rect.x + padding) as f32,
            (rect.y + padding) as f32,
            glyph.image.width as f32,
            glyph.image.height as f32,
        );
    }

    placements
}

/// One rectangle offered to [`SkylinePacker::pack`]
#[derive(Debug, Clone, Copy)]
pub struct PackRect {
    /// Caller-assigned identity, preserved across packing
    pub id: usize,
    pub w: u32,
    pub h: u32,
    /// Placement, valid when `was_packed` is set
    pub x: u32,
    pub y: u32,
    pub was_packed: bool,
}

impl PackRect {
    pub fn new(id: usize, w: u32, h: u32) -> Self {
        Self {
            id,
            w,
            h,
            x: 0,
            y: 0,
            was_packed: false,
        }
    }
}

/// Segment of the skyline: the packed region below `[x, x + width)` ends at
/// height `y`
#[derive(Debug, Clone, Copy)]
struct SkylineNode {
    x: u32,
    y: u32,
    width: u32,
}

/// Bottom-left skyline rectangle packer.
///
/// Maintains the upper profile of all placed rectangles and greedily drops
/// each new rectangle at the lowest (then leftmost) point of the profile
/// where it fits.
pub struct SkylinePacker {
    width: u32,
    height: u32,
    skyline: Vec<SkylineNode>,
}

impl SkylinePacker {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            skyline: vec![SkylineNode {
                x: 0,
                y: 0,
                width,
            }],
        }
    }

    /// Pack rectangles into the region, annotating each with its placement
    /// and success flag. Rectangles that do not fit are flagged, never
    /// abort the rest.
    ///
    /// Processing runs tallest-first for a tighter profile; the slice order
    /// is left untouched so `id`/index identity is preserved.
    pub fn pack(&mut self, rects: &mut [PackRect]) {
        let mut order: Vec<usize> = (0..rects.len()).collect();
        order.sort_by(|&a, &b| rects[b].h.cmp(&rects[a].h).then(rects[b].w.cmp(&rects[a].w)));

        for i in order {
            let (w, h) = (rects[i].w, rects[i].h);
            if let Some((x, y)) = self.find_position(w, h) {
                self.place(x, y, w, h);
                rects[i].x = x;
                rects[i].y = y;
                rects[i].was_packed = true;
            }
        }
    }

    /// Lowest-then-leftmost position where a w x h rectangle fits
    fn find_position(&self, w: u32, h: u32) -> Option<(u32, u32)> {
        if w == 0 || h == 0 || w > self.width {
            return None;
        }

        let mut best: Option<(u32, u32)> = None;
        for node in &self.skyline {
            let x = node.x;
            if x + w > self.width {
                break;
            }
            let y = self.profile_height(x, w);
            if y + h > self.height {
                continue;
            }
            if best.map_or(true, |(_, best_y)| y < best_y) {
                best = Some((x, y));
            }
        }
        best
    }

    /// Height of the skyline over the span `[x, x + w)`
    fn profile_height(&self, x: u32, w: u32) -> u32 {
        let mut max_y = 0;
        for node in &self.skyline {
            if node.x + node.width <= x {
                continue;
            }
            if node.x >= x + w {
                break;
            }
            max_y = max_y.max(node.y);
        }
        max_y
    }

    /// Raise the skyline over `[x, x + w)` to `y + h`
    fn place(&mut self, x: u32, y: u32, w: u32, h: u32) {
        let top = y + h;
        let mut updated: Vec<SkylineNode> = Vec::with_capacity(self.skyline.len() + 2);

        for node in &self.skyline {
            let node_end = node.x + node.width;
            if node_end <= x || node.x >= x + w {
                updated.push(*node);
                continue;
            }
            // Keep the uncovered left part of a node straddling the span
            if node.x < x {
                updated.push(SkylineNode {
                    x: node.x,
                    y: node.y,
                    width: x - node.x,
                });
            }
            // Keep the uncovered right part
            if node_end > x + w {
                updated.push(SkylineNode {
                    x: x + w,
                    y: node.y,
                    width: node_end - (x + w),
                });
            }
        }

        updated.push(SkylineNode { x, y: top, width: w });
        updated.sort_by_key(|node| node.x);

        // Merge adjacent segments at equal height
        let mut merged: Vec<SkylineNode> = Vec::with_capacity(updated.len());
        for node in updated {
            match merged.last_mut() {
                Some(last) if last.y == node.y && last.x + last.width == node.x => {
                    last.width += node.width;
                }
                _ => merged.push(node),
            }
        }
        self.skyline = merged;
    }
}
