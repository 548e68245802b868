//! Font object
//!
//! A `Font` couples extracted glyph metrics with their atlas placements and
//! the uploaded atlas texture. Assembly runs extraction then packing, then
//! rebinds every glyph bitmap to a crop of the finished atlas so glyph
//! pixels and atlas pixels can never diverge.

use crate::atlas::{gen_font_atlas, PackMethod};
use crate::codepoint::REPLACEMENT_CODEPOINT;
use crate::glyph::{load_glyph_data, GlyphData, RenderMode};
use crate::raster::{OutlineRasterizer, Rasterizer};
use crate::{Result, TextError};
use glint_core::{Image, Rect, TextureFilter, TextureHandle, TextureUploader};
use std::path::Path;

/// Default pixel size for TTF font generation
pub const DEFAULT_FONT_SIZE: i32 = 32;
/// Default margin around every glyph in the atlas
pub const DEFAULT_ATLAS_PADDING: u32 = 2;

/// Parameters for font assembly
#[derive(Debug, Clone)]
pub struct FontLoadOptions {
    /// Pixel size glyph metrics are generated at
    pub size: i32,
    /// Codepoints to extract; `None` selects ASCII 32..=126
    pub codepoints: Option<Vec<u32>>,
    /// Glyph bitmap generation mode
    pub mode: RenderMode,
    /// Atlas packing strategy
    pub pack_method: PackMethod,
    /// Margin around every glyph in the atlas, in pixels
    pub padding: u32,
    /// Sampling filter applied to the uploaded atlas
    pub filter: TextureFilter,
}

impl Default for FontLoadOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_FONT_SIZE,
            codepoints: None,
            mode: RenderMode::default(),
            pack_method: PackMethod::default(),
            padding: DEFAULT_ATLAS_PADDING,
            filter: TextureFilter::Point,
        }
    }
}

/// One glyph of an assembled font: metrics plus its atlas source rectangle.
///
/// Metrics and placement travel together in a single sequence, so they can
/// never be reordered independently.
#[derive(Debug, Clone)]
pub struct Glyph {
    /// Extracted metrics; `info.image` is a crop of the atlas after assembly
    pub info: GlyphData,
    /// Source rectangle within the atlas texture; all-zero when the glyph
    /// did not fit during packing
    pub source: Rect,
}

/// An assembled font: glyphs, placements, and the uploaded atlas
#[derive(Debug)]
pub struct Font {
    base_size: i32,
    glyphs: Vec<Glyph>,
    texture: TextureHandle,
    owns_resources: bool,
}

impl Font {
    /// Load and assemble a font from a TTF/OTF file with default options
    pub fn load(path: impl AsRef<Path>, uploader: &mut dyn TextureUploader) -> Result<Font> {
        Self::load_with(path, FontLoadOptions::default(), uploader)
    }

    /// Load and assemble a font from a TTF/OTF file
    pub fn load_with(
        path: impl AsRef<Path>,
        options: FontLoadOptions,
        uploader: &mut dyn TextureUploader,
    ) -> Result<Font> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            tracing::warn!("could not read font file {}: {e}", path.display());
            TextError::FontLoadError(format!("{}: {e}", path.display()))
        })?;
        Self::from_bytes(data, options, uploader)
    }

    /// Assemble a font from raw TTF/OTF bytes
    pub fn from_bytes(
        data: Vec<u8>,
        options: FontLoadOptions,
        uploader: &mut dyn TextureUploader,
    ) -> Result<Font> {
        let mut rasterizer = OutlineRasterizer::from_bytes(data).map_err(|e| {
            tracing::warn!("font rejected by rasterizer: {e}");
            e
        })?;
        Self::from_rasterizer(&mut rasterizer, options, uploader)
    }

    /// Assemble a font from an already initialized rasterizer.
    ///
    /// Runs the full pipeline: extract glyph records, pack the atlas, rebind
    /// glyph bitmaps to atlas crops, upload the atlas, drop the CPU copy.
    pub fn from_rasterizer(
        rasterizer: &mut dyn Rasterizer,
        options: FontLoadOptions,
        uploader: &mut dyn TextureUploader,
    ) -> Result<Font> {
        let records = load_glyph_data(
            rasterizer,
            options.size,
            options.codepoints.as_deref(),
            options.mode,
        );
        if records.is_empty() {
            return Err(TextError::FontLoadError(
                "no glyphs could be extracted".into(),
            ));
        }

        let atlas = gen_font_atlas(&records, options.size, options.padding, options.pack_method);

        let glyphs = records
            .into_iter()
            .zip(atlas.placements)
            .map(|(mut info, source)| {
                // The standalone bitmap is superseded by the packed atlas;
                // rebind so the two can never diverge
                info.image = if source.is_degenerate() {
                    Image::empty()
                } else {
                    Image::from_image(&atlas.image, source)
                };
                Glyph { info, source }
            })
            .collect();

        let texture = uploader.upload(&atlas.image);
        uploader.set_filter(&texture, options.filter);

        Ok(Font {
            base_size: options.size,
            glyphs,
            texture,
            owns_resources: true,
        })
    }

    /// Pixel size the glyph metrics were generated at
    pub fn base_size(&self) -> i32 {
        self.base_size
    }

    /// Glyphs in extraction order; indices returned by
    /// [`glyph_index`](Self::glyph_index) point into this slice
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Handle of the uploaded atlas texture
    pub fn texture(&self) -> &TextureHandle {
        &self.texture
    }

    /// Whether [`unload`](Self::unload) releases the texture.
    ///
    /// A font shared as a process-wide default should be marked
    /// `owns_resources = false` so tearing down a borrowing user cannot
    /// release the shared texture.
    pub fn owns_resources(&self) -> bool {
        self.owns_resources
    }

    pub fn set_owns_resources(&mut self, owns: bool) {
        self.owns_resources = owns;
    }

    /// Index of the glyph for `codepoint`.
    ///
    /// Falls back to the replacement glyph ('?') when the codepoint is not
    /// in the set, and to index 0 when the set has no '?' either. Linear
    /// scan: glyph sets are small (typically under a few hundred), so a
    /// lookup table is not worth the indirection.
    pub fn glyph_index(&self, codepoint: u32) -> usize {
        self.find(codepoint)
            .or_else(|| self.find(REPLACEMENT_CODEPOINT))
            .unwrap_or(0)
    }

    fn find(&self, codepoint: u32) -> Option<usize> {
        self.glyphs.iter().position(|g| g.info.value == codepoint)
    }

    /// Tear down the font: glyph bitmaps, placements, and the texture are
    /// released together. The texture is kept alive when the font does not
    /// own its resources (shared default font).
    pub fn unload(self, uploader: &mut dyn TextureUploader) {
        if self.owns_resources {
            uploader.unload(self.texture);
            tracing::debug!("unloaded font data");
        }
        // self.glyphs dropped here, releasing every bitmap and rectangle
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{FakeRasterizer, RecordingUploader};
    use super::*;

    fn assemble(options: FontLoadOptions) -> (Font, RecordingUploader) {
        let mut uploader = RecordingUploader::default();
        let font = Font::from_rasterizer(&mut FakeRasterizer, options, &mut uploader)
            .expect("assembly succeeds");
        (font, uploader)
    }

    #[test]
    fn test_default_assembly_has_full_ascii_set() {
        let (font, uploader) = assemble(FontLoadOptions::default());

        assert_eq!(font.base_size(), 32);
        assert_eq!(font.glyph_count(), 95);
        assert_eq!(uploader.uploads.len(), 1);
        assert_eq!(uploader.filters, vec![(1, TextureFilter::Point)]);

        // Default scenario: every placement non-degenerate, sizes exact
        for glyph in font.glyphs() {
            assert!(!glyph.source.is_degenerate());
            assert_eq!(glyph.source.width, glyph.info.image.width as f32);
            assert_eq!(glyph.source.height, glyph.info.image.height as f32);
        }
    }

    #[test]
    fn test_glyph_bitmaps_are_atlas_crops() {
        let (font, _) = assemble(FontLoadOptions::default());
        let glyph = &font.glyphs()[font.glyph_index('A' as u32)];

        // Rebound bitmaps take the atlas format (gray+alpha) and the
        // placement's exact size
        assert_eq!(glyph.info.image.format, glint_core::PixelFormat::GrayAlpha);
        assert_eq!(glyph.info.image.width as f32, glyph.source.width);
        assert_eq!(glyph.info.image.height as f32, glyph.source.height);
        // FakeRasterizer renders solid coverage, so every alpha byte is 255
        assert!(glyph.info.image.data.chunks_exact(2).all(|px| px[1] == 255));
    }

    #[test]
    fn test_glyph_index_exact_and_fallback() {
        let (font, _) = assemble(FontLoadOptions::default());

        for (i, glyph) in font.glyphs().iter().enumerate() {
            assert_eq!(font.glyph_index(glyph.info.value), i);
        }
        // Absent codepoint falls back to the '?' glyph
        let question = font.glyph_index('?' as u32);
        assert_eq!(font.glyph_index(0x10FF), question);
    }

    #[test]
    fn test_glyph_index_without_replacement_glyph() {
        let options = FontLoadOptions {
            codepoints: Some(vec!['a' as u32, 'b' as u32]),
            ..FontLoadOptions::default()
        };
        let (font, _) = assemble(options);
        assert_eq!(font.glyph_index('z' as u32), 0);
    }

    #[test]
    fn test_unload_releases_owned_texture_only() {
        let (font, mut uploader) = assemble(FontLoadOptions::default());
        let id = font.texture().id;
        font.unload(&mut uploader);
        assert_eq!(uploader.released, vec![id]);

        let (mut shared, mut uploader) = assemble(FontLoadOptions::default());
        shared.set_owns_resources(false);
        shared.unload(&mut uploader);
        assert!(uploader.released.is_empty());
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let mut uploader = RecordingUploader::default();
        let result = Font::from_bytes(vec![0, 1, 2, 3], FontLoadOptions::default(), &mut uploader);
        assert!(result.is_err());
        assert!(uploader.uploads.is_empty());
    }

    #[test]
    fn test_load_missing_file_is_unusable_font_error() {
        let mut uploader = RecordingUploader::default();
        let result = Font::load("/nonexistent/no-such-font.ttf", &mut uploader);
        assert!(matches!(result, Err(TextError::FontLoadError(_))));
        assert!(uploader.uploads.is_empty());
    }

    #[test]
    fn test_custom_codepoint_set_preserves_order() {
        let set = vec!['W' as u32, 'a' as u32, '0' as u32];
        let options = FontLoadOptions {
            codepoints: Some(set.clone()),
            ..FontLoadOptions::default()
        };
        let (font, _) = assemble(options);

        assert_eq!(font.glyph_count(), 3);
        for (glyph, expected) in font.glyphs().iter().zip(set) {
            assert_eq!(glyph.info.value, expected);
        }
    }
}
