//! Texture upload interface
//!
//! The text stack builds atlases on the CPU and hands them to a renderer
//! through [`TextureUploader`]. The uploader owns the GPU side; this crate
//! only defines the contract and the opaque handle passed back.

use crate::image::{Image, PixelFormat};

/// Sampling filter applied to an uploaded texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureFilter {
    /// Nearest-neighbor sampling (crisp pixel fonts, best performance)
    #[default]
    Point,
    /// Linear interpolation (smooth scaling, SDF fonts)
    Bilinear,
}

/// Opaque handle to an uploaded texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureHandle {
    /// Renderer-assigned identifier
    pub id: u32,
    /// Width of the uploaded image in pixels
    pub width: u32,
    /// Height of the uploaded image in pixels
    pub height: u32,
    /// Pixel layout of the uploaded image
    pub format: PixelFormat,
}

/// Moves CPU images into renderer-owned textures
pub trait TextureUploader {
    /// Upload an image, returning a handle valid until [`unload`](Self::unload)
    fn upload(&mut self, image: &Image) -> TextureHandle;

    /// Change the sampling filter of an uploaded texture
    fn set_filter(&mut self, texture: &TextureHandle, filter: TextureFilter);

    /// Release an uploaded texture
    fn unload(&mut self, texture: TextureHandle);
}
