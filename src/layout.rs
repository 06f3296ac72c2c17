//! Overlay placement geometry.
//!
//! The layout rule is fixed: the overlay is scaled to a fraction of the
//! base image's width (aspect ratio preserved) and centered. All math is
//! pure and deterministic; the same inputs always produce bit-identical
//! output.

use crate::asset::{SizeF, SizePx};
use crate::error::{ComposeError, ComposeResult};

/// Default overlay width as a fraction of the base image width.
pub const DEFAULT_OVERLAY_FRACTION: f32 = 0.45;

/// Where and how large the overlay is drawn, in base-image pixel
/// coordinates.
///
/// Computed fresh whenever layout inputs change; never persisted. By
/// construction the rectangle lies fully inside the base image for any
/// fraction in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Placement {
    /// Returns the right edge coordinate (x + width).
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Returns the bottom edge coordinate (y + height).
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Computes the overlay placement for the given base and overlay sizes.
///
/// `width = base.width * fraction`, height follows the overlay's aspect
/// ratio, and the rectangle is centered on both axes.
///
/// Fails with [`ComposeError::DegenerateAsset`] when the overlay width is
/// not positive, since the aspect-ratio division is undefined there.
pub fn compute_placement(
    base: SizePx,
    overlay: SizeF,
    fraction: f32,
) -> ComposeResult<Placement> {
    if overlay.width <= 0.0 {
        return Err(ComposeError::degenerate("overlay width must be > 0"));
    }

    let width = base.width as f32 * fraction;
    let height = width * (overlay.height / overlay.width);
    let x = (base.width as f32 - width) / 2.0;
    let y = (base.height as f32 - height) / 2.0;

    Ok(Placement {
        x,
        y,
        width,
        height,
    })
}
