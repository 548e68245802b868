//! Core value types shared across the Glint text stack
//!
//! This crate provides:
//! - 2D geometry primitives (`Vec2`, `Rect`)
//! - A generic CPU-side bitmap type (`Image`) with crop support
//! - The texture upload interface used to move bitmaps to the GPU

pub mod geometry;
pub mod image;
pub mod texture;

pub use geometry::{Rect, Vec2};
pub use image::{Image, PixelFormat};
pub use texture::{TextureFilter, TextureHandle, TextureUploader};
