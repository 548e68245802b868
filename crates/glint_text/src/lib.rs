//! Font atlas generation and text layout
//!
//! This crate provides:
//! - A resilient UTF-8 codepoint decoder with deterministic recovery
//! - Glyph metrics extraction (bitmap, anti-aliased, or SDF) via swash
//! - Atlas packing with two strategies (row-based and skyline)
//! - A `Font` object owning glyph metrics, placements, and the atlas texture
//! - Text measurement and draw-command layout over that `Font`

pub mod atlas;
pub mod codepoint;
pub mod font;
pub mod glyph;
pub mod layout;
pub mod raster;

pub use atlas::{FontAtlas, PackMethod, PackRect, SkylinePacker};
pub use codepoint::{codepoints, next_codepoint, Codepoints, REPLACEMENT_CODEPOINT};
pub use font::{Font, FontLoadOptions, Glyph};
pub use glyph::{load_glyph_data, GlyphData, RenderMode};
pub use layout::{layout_text, layout_text_bytes, measure_text, measure_text_bytes, GlyphQuad};
pub use raster::{OutlineRasterizer, RasterizedGlyph, Rasterizer, VerticalMetrics};

use thiserror::Error;

/// Text stack errors
#[derive(Error, Debug)]
pub enum TextError {
    #[error("failed to load font: {0}")]
    FontLoadError(String),

    #[error("failed to parse font: {0}")]
    FontParseError(String),

    #[error("invalid font data")]
    InvalidFontData,
}

pub type Result<T> = std::result::Result<T, TextError>;
