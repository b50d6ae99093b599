//! Texture bitmap references and the external rasterizer boundary
//!
//! The pipeline never rasterizes artwork itself; it asks an injected
//! [`Rasterizer`] for a bitmap file and carries the result around by
//! reference only.

use std::path::{Path, PathBuf};

use crate::Result;

/// Side length of the square texture requested from the rasterizer.
pub const DEFAULT_TEXTURE_SIZE: u32 = 2048;

/// How a bitmap's alpha channel is treated downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaMode {
    /// Alpha is ignored; the asset renders fully opaque.
    None,
    /// Alpha is carried through as-is.
    #[default]
    Straight,
}

/// Reference to an externally rasterized RGBA image.
///
/// Pixel data is never owned here, only the file handle and the declared
/// alpha policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureBitmap {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub alpha: AlphaMode,
}

impl TextureBitmap {
    pub fn new(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            path: path.into(),
            width,
            height,
            alpha: AlphaMode::default(),
        }
    }

    /// Reference an image file on disk, reading only its header for the
    /// dimensions.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let (width, height) = image::image_dimensions(&path)?;
        Ok(Self::new(path, width, height))
    }
}

/// A request for a rasterized version of the source artwork.
#[derive(Debug, Clone, Copy)]
pub struct RasterizeRequest {
    /// Square output resolution; the resize is exact, aspect is not kept.
    pub size: u32,
    /// Trim surrounding empty space before resizing.
    pub trim: bool,
    /// Render onto a transparent background.
    pub transparent_background: bool,
}

impl Default for RasterizeRequest {
    fn default() -> Self {
        Self {
            size: DEFAULT_TEXTURE_SIZE,
            trim: true,
            transparent_background: true,
        }
    }
}

impl RasterizeRequest {
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }
}

/// Injected capability turning an artwork path into a bitmap file.
///
/// Keeping this a trait lets tests substitute a stub instead of spawning a
/// real external tool.
pub trait Rasterizer {
    fn rasterize(&self, artwork: &Path, request: &RasterizeRequest) -> Result<PathBuf>;
}

/// Bitmap path derived from the artwork path: same base name, `.png`.
pub fn bitmap_path_for(artwork: &Path) -> PathBuf {
    artwork.with_extension("png")
}
