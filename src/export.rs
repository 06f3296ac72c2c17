//! JPEG serialization of the composite buffer.
//!
//! Export always happens at the buffer's native resolution; the preview's
//! display scaling never applies here. JPEG carries no alpha channel, so
//! the RGBA buffer is flattened to RGB before encoding.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, RgbaImage};
use tracing::debug;

use crate::error::{ComposeError, ComposeResult};

/// File name offered for the downloaded export.
pub const EXPORT_FILE_NAME: &str = "overlay-image.jpg";

/// Default JPEG quality for exports.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Encodes the composite buffer as JPEG bytes at native resolution.
///
/// Deterministic for a fixed buffer and quality.
pub fn encode_jpeg(buffer: &RgbaImage, quality: u8) -> ComposeResult<Vec<u8>> {
    let rgb = DynamicImage::ImageRgba8(buffer.clone()).to_rgb8();

    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
    encoder
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| ComposeError::encode(format!("jpeg: {e}")))?;

    debug!(
        width = buffer.width(),
        height = buffer.height(),
        bytes = out.len(),
        "export encoded"
    );
    Ok(out)
}
