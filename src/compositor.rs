//! The compositing pipeline: ordered draw passes onto a native-resolution
//! buffer.
//!
//! Every render fully re-executes the pass sequence; there is no
//! incremental update. The buffer is sized to the base image's natural
//! dimensions and the on-screen preview scaling never feeds back into it.

use image::{Rgba, RgbaImage, imageops};
use tracing::debug;

use crate::asset::{Bitmap, VectorAsset};
use crate::error::ComposeResult;
use crate::layout::{DEFAULT_OVERLAY_FRACTION, compute_placement};
use crate::svg;

/// Backing rectangle fill: white at 50% opacity, drawn between the
/// photograph and the overlay.
const BACKING_COLOR: Rgba<u8> = Rgba([255, 255, 255, 128]);

/// Compositor configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    /// Draw the semi-transparent backing rectangle behind the overlay.
    pub backing_rectangle: bool,

    /// Overlay width as a fraction of the base image width.
    pub overlay_fraction: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            backing_rectangle: false,
            overlay_fraction: DEFAULT_OVERLAY_FRACTION,
        }
    }
}

// ============================================================================
// Compositor
// ============================================================================

/// Renders the base photograph and the overlay into a single pixel buffer.
///
/// The compositor owns the buffer exclusively. Downstream consumers (the
/// preview presenter, the export encoder) read it and never mutate it. A
/// failed render discards the buffer; callers retry by rendering again.
#[derive(Debug, Default)]
pub struct Compositor {
    buffer: Option<RgbaImage>,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The buffer produced by the most recent successful render.
    pub fn buffer(&self) -> Option<&RgbaImage> {
        self.buffer.as_ref()
    }

    /// Executes the draw passes and returns the composited buffer.
    ///
    /// 1. Size the buffer to the base image's native dimensions and clear it.
    /// 2. Blit the base at the origin, full opacity.
    /// 3. Optionally fill the placement rectangle with [`BACKING_COLOR`].
    /// 4. Rasterize the overlay to the placement size and composite it at
    ///    full opacity; the backing pass's alpha never applies to it.
    pub fn render(
        &mut self,
        base: &Bitmap,
        overlay: &VectorAsset,
        settings: &RenderSettings,
    ) -> ComposeResult<&RgbaImage> {
        let (width, height) = (base.width(), base.height());
        debug!(width, height, "compositing at native resolution");

        // Reuse the allocation when dimensions are unchanged. A render in
        // progress has taken the buffer; any failure below leaves it empty.
        let mut buffer = match self.buffer.take() {
            Some(mut buf) if buf.dimensions() == (width, height) => {
                for px in buf.pixels_mut() {
                    *px = Rgba([0, 0, 0, 0]);
                }
                buf
            }
            _ => RgbaImage::new(width, height),
        };

        imageops::replace(&mut buffer, base.data(), 0, 0);

        let placement = compute_placement(
            base.size(),
            overlay.natural_size(),
            settings.overlay_fraction,
        )?;
        let overlay_w = (placement.width.round() as u32).max(1);
        let overlay_h = (placement.height.round() as u32).max(1);
        let overlay_x = placement.x.round() as i32;
        let overlay_y = placement.y.round() as i32;
        debug!(
            overlay_w,
            overlay_h, overlay_x, overlay_y, "overlay placement"
        );

        if settings.backing_rectangle {
            svg::fill_rect_over(
                &mut buffer,
                overlay_x,
                overlay_y,
                overlay_w,
                overlay_h,
                BACKING_COLOR,
            );
        }

        let overlay_img = overlay.rasterize(overlay_w, overlay_h)?;
        svg::composite_over(&mut buffer, &overlay_img, overlay_x, overlay_y);

        Ok(self.buffer.insert(buffer))
    }
}
