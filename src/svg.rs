//! SVG rasterization and pixel compositing helpers.
//!
//! Rasterization goes through resvg/tiny-skia; the results come back as
//! premultiplied pixels and are unpremultiplied into `image::RgbaImage`
//! before compositing.

use image::{Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::Tree;

use crate::error::{ComposeError, ComposeResult};

// ============================================================================
// Rasterization
// ============================================================================

/// Rasterizes an SVG tree to exactly `width` x `height` pixels.
///
/// The horizontal and vertical scales are derived independently from the
/// tree's natural size, so the output always matches the requested pixel
/// dimensions.
pub(crate) fn rasterize_tree(tree: &Tree, width: u32, height: u32) -> ComposeResult<RgbaImage> {
    if width == 0 || height == 0 {
        return Err(ComposeError::degenerate("overlay raster size is zero"));
    }

    let size = tree.size();
    if size.width() <= 0.0 || size.height() <= 0.0 {
        return Err(ComposeError::degenerate("svg has no intrinsic size"));
    }

    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| ComposeError::decode("failed to allocate svg pixmap"))?;

    let sx = width as f32 / size.width();
    let sy = height as f32 / size.height();
    resvg::render(tree, Transform::from_scale(sx, sy), &mut pixmap.as_mut());

    Ok(pixmap_to_rgba_image(&pixmap))
}

/// Converts a tiny_skia Pixmap to an image::RgbaImage.
fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let width = pixmap.width();
    let height = pixmap.height();
    let mut img = RgbaImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let pixel = pixmap.pixel(x, y).unwrap();
            // tiny_skia uses premultiplied alpha, we need to unpremultiply
            let (r, g, b, a) =
                unpremultiply(pixel.red(), pixel.green(), pixel.blue(), pixel.alpha());
            img.put_pixel(x, y, Rgba([r, g, b, a]));
        }
    }

    img
}

/// Unpremultiplies a premultiplied alpha pixel.
fn unpremultiply(r: u8, g: u8, b: u8, a: u8) -> (u8, u8, u8, u8) {
    if a == 0 {
        (0, 0, 0, 0)
    } else {
        let a_f = a as f32 / 255.0;
        (
            (r as f32 / a_f).round().min(255.0) as u8,
            (g as f32 / a_f).round().min(255.0) as u8,
            (b as f32 / a_f).round().min(255.0) as u8,
            a,
        )
    }
}

// ============================================================================
// Compositing
// ============================================================================

/// Composites a source image onto a destination image at the specified position.
///
/// Uses standard alpha blending (source over destination). Pixels falling
/// outside the destination are clipped.
pub(crate) fn composite_over(dest: &mut RgbaImage, src: &RgbaImage, x: i32, y: i32) {
    let dest_width = dest.width() as i32;
    let dest_height = dest.height() as i32;

    for sy in 0..src.height() {
        for sx in 0..src.width() {
            let dx = x + sx as i32;
            let dy = y + sy as i32;

            if dx < 0 || dy < 0 || dx >= dest_width || dy >= dest_height {
                continue;
            }

            let src_pixel = src.get_pixel(sx, sy);
            let dst_pixel = dest.get_pixel(dx as u32, dy as u32);

            let blended = alpha_blend(*src_pixel, *dst_pixel);
            dest.put_pixel(dx as u32, dy as u32, blended);
        }
    }
}

/// Blends a constant color over a rectangular region of the destination.
///
/// This is the backing-rectangle pass: the color's own alpha controls the
/// blend, and the region is clipped to the destination bounds.
pub(crate) fn fill_rect_over(
    dest: &mut RgbaImage,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    color: Rgba<u8>,
) {
    let dest_width = dest.width() as i32;
    let dest_height = dest.height() as i32;

    for ry in 0..height {
        for rx in 0..width {
            let dx = x + rx as i32;
            let dy = y + ry as i32;

            if dx < 0 || dy < 0 || dx >= dest_width || dy >= dest_height {
                continue;
            }

            let dst_pixel = dest.get_pixel(dx as u32, dy as u32);
            let blended = alpha_blend(color, *dst_pixel);
            dest.put_pixel(dx as u32, dy as u32, blended);
        }
    }
}

/// Alpha blends two RGBA pixels (source over destination).
fn alpha_blend(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;

    let out_a = sa + da * (1.0 - sa);

    if out_a == 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend = |s: u8, d: u8| -> u8 {
        let sf = s as f32 / 255.0;
        let df = d as f32 / 255.0;
        let out = (sf * sa + df * da * (1.0 - sa)) / out_a;
        (out * 255.0).round() as u8
    };

    Rgba([
        blend(src[0], dst[0]),
        blend(src[1], dst[1]),
        blend(src[2], dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use resvg::usvg::{Options, Tree};

    const SIMPLE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100"><circle cx="50" cy="50" r="40" fill="#ff0000"/></svg>"##;

    fn parse(svg: &str) -> Tree {
        Tree::from_str(svg, &Options::default()).unwrap()
    }

    #[test]
    fn rasterize_exact_size() {
        let tree = parse(SIMPLE_SVG);
        let img = rasterize_tree(&tree, 50, 25).unwrap();
        assert_eq!(img.dimensions(), (50, 25));
    }

    #[test]
    fn rasterize_zero_size_is_degenerate() {
        let tree = parse(SIMPLE_SVG);
        let err = rasterize_tree(&tree, 0, 25).unwrap_err();
        assert!(matches!(err, crate::error::ComposeError::DegenerateAsset(_)));
    }

    #[test]
    fn composite_simple() {
        // Create a 10x10 red background
        let mut dest = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));

        // Create a 4x4 blue overlay
        let src = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]));

        composite_over(&mut dest, &src, 3, 3);

        // Check that the overlay area is blue
        assert_eq!(dest.get_pixel(5, 5).0, [0, 0, 255, 255]);

        // Check that outside the overlay is still red
        assert_eq!(dest.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn composite_with_transparency() {
        let mut dest = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
        let src = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 128]));

        composite_over(&mut dest, &src, 0, 0);

        // The result should be a blend of red and blue
        let pixel = dest.get_pixel(0, 0);
        assert!(pixel[0] > 0, "Should have some red");
        assert!(pixel[2] > 0, "Should have some blue");
    }

    #[test]
    fn composite_clips_out_of_bounds() {
        let mut dest = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        let src = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]));

        composite_over(&mut dest, &src, -2, -2);

        assert_eq!(dest.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(dest.get_pixel(3, 3).0, [255, 0, 0, 255]);
    }

    #[test]
    fn fill_rect_blends_half_opacity() {
        let mut dest = RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 255]));

        fill_rect_over(&mut dest, 2, 2, 4, 4, Rgba([255, 255, 255, 128]));

        // Inside the rect: red pulled halfway toward white
        let inside = dest.get_pixel(4, 4);
        assert_eq!(inside[0], 255);
        assert!(inside[1] > 100 && inside[1] < 160, "g = {}", inside[1]);
        assert_eq!(inside[3], 255);

        // Outside the rect: untouched
        assert_eq!(dest.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn fill_rect_clips_to_destination() {
        let mut dest = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        fill_rect_over(&mut dest, 2, 2, 10, 10, Rgba([255, 255, 255, 255]));

        assert_eq!(dest.get_pixel(3, 3).0, [255, 255, 255, 255]);
        assert_eq!(dest.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }
}
