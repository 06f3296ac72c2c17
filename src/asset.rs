//! Decoded asset types: the raster base photograph and the vector overlay.
//!
//! Both types are immutable once decoded. Decoding is delegated to the
//! platform crates (`image` for raster bytes, `usvg` for SVG markup); this
//! module only wraps the results with the accessors the pipeline needs.

use image::RgbaImage;
use resvg::usvg;

use crate::error::{ComposeError, ComposeResult};
use crate::svg;

/// A 2D size in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizePx {
    pub width: u32,
    pub height: u32,
}

impl SizePx {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A 2D size in fractional pixels, as reported by vector assets.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SizeF {
    pub width: f32,
    pub height: f32,
}

impl SizeF {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl From<SizePx> for SizeF {
    fn from(size: SizePx) -> Self {
        Self::new(size.width as f32, size.height as f32)
    }
}

// ============================================================================
// Bitmap
// ============================================================================

/// A decoded raster image in RGBA8 form.
///
/// The pixel data is never mutated after decoding; the compositor blits
/// from it into its own buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    data: RgbaImage,
}

impl Bitmap {
    /// Wraps an already-decoded RGBA image.
    pub fn new(data: RgbaImage) -> Self {
        Self { data }
    }

    /// Decodes JPEG bytes into a bitmap.
    ///
    /// The decode is pinned to the JPEG format: bytes of any other format
    /// fail with [`ComposeError::Decode`] even if they are a valid image.
    pub fn decode_jpeg(bytes: &[u8]) -> ComposeResult<Self> {
        let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Jpeg)
            .map_err(|e| ComposeError::decode(format!("jpeg: {e}")))?;
        Ok(Self {
            data: img.to_rgba8(),
        })
    }

    /// Natural size in pixels.
    pub fn size(&self) -> SizePx {
        SizePx::new(self.data.width(), self.data.height())
    }

    pub fn width(&self) -> u32 {
        self.data.width()
    }

    pub fn height(&self) -> u32 {
        self.data.height()
    }

    /// The decoded pixels.
    pub fn data(&self) -> &RgbaImage {
        &self.data
    }
}

// ============================================================================
// VectorAsset
// ============================================================================

/// A parsed vector overlay.
///
/// Wraps a `usvg` tree and exposes the two capabilities the pipeline
/// needs: the natural size (for layout) and rasterization at an exact
/// pixel size (for the overlay draw pass).
pub struct VectorAsset {
    tree: usvg::Tree,
}

impl std::fmt::Debug for VectorAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let size = self.natural_size();
        f.debug_struct("VectorAsset")
            .field("width", &size.width)
            .field("height", &size.height)
            .finish()
    }
}

impl VectorAsset {
    /// Parses SVG bytes into a vector asset.
    pub fn parse(bytes: &[u8]) -> ComposeResult<Self> {
        let opts = usvg::Options::default();
        let tree = usvg::Tree::from_data(bytes, &opts)
            .map_err(|e| ComposeError::decode(format!("svg: {e}")))?;
        Ok(Self { tree })
    }

    /// Natural size declared by the SVG document.
    pub fn natural_size(&self) -> SizeF {
        let size = self.tree.size();
        SizeF::new(size.width(), size.height())
    }

    /// Rasterizes the vector content to exactly `width` x `height` pixels.
    pub fn rasterize(&self, width: u32, height: u32) -> ComposeResult<RgbaImage> {
        svg::rasterize_tree(&self.tree, width, height)
    }
}
