use image::{imageops, Rgba, RgbaImage};

use super::FlipDirection;
use crate::error::{PipelineError, Result};
use crate::roi::PixelRect;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Mirror along the given axis.
pub fn flip(image: &RgbaImage, direction: FlipDirection) -> RgbaImage {
    match direction {
        FlipDirection::Horizontal => imageops::flip_horizontal(image),
        FlipDirection::Vertical => imageops::flip_vertical(image),
    }
}

/// Rotate clockwise by `degrees` about the image centre.
///
/// Width and height swap whenever the angle is not a multiple of 180, even
/// for arbitrary angles, so oblique rotations crop the corners and leave
/// uncovered areas transparent. Quarter turns are exact pixel permutations.
pub fn rotate(image: &RgbaImage, degrees: f64) -> RgbaImage {
    let turn = degrees.rem_euclid(360.0);
    if turn == 0.0 {
        return image.clone();
    } else if turn == 90.0 {
        return imageops::rotate90(image);
    } else if turn == 180.0 {
        return imageops::rotate180(image);
    } else if turn == 270.0 {
        return imageops::rotate270(image);
    }

    let (w, h) = image.dimensions();
    let (out_w, out_h) = if turn % 180.0 != 0.0 { (h, w) } else { (w, h) };
    rotate_onto(image, turn, out_w, out_h)
}

/// Rotate clockwise by `degrees` about the centre onto a canvas of the same
/// size, the way a drawing-context transform would.
///
/// Content leaving the canvas is cut and uncovered areas are transparent.
/// Dimensions never change, so on-screen coordinates keep mapping 1:1.
pub fn rotate_within(image: &RgbaImage, degrees: f64) -> RgbaImage {
    let turn = degrees.rem_euclid(360.0);
    if turn == 0.0 {
        return image.clone();
    } else if turn == 180.0 {
        return imageops::rotate180(image);
    }
    let (w, h) = image.dimensions();
    rotate_onto(image, turn, w, h)
}

fn rotate_onto(image: &RgbaImage, turn: f64, out_w: u32, out_h: u32) -> RgbaImage {
    let (w, h) = image.dimensions();
    let (sin, cos) = turn.to_radians().sin_cos();
    let (src_cx, src_cy) = (f64::from(w) / 2.0, f64::from(h) / 2.0);
    let (dst_cx, dst_cy) = (f64::from(out_w) / 2.0, f64::from(out_h) / 2.0);

    RgbaImage::from_fn(out_w, out_h, |x, y| {
        let dx = f64::from(x) + 0.5 - dst_cx;
        let dy = f64::from(y) + 0.5 - dst_cy;
        // Inverse of a clockwise rotation in y-down coordinates.
        let sx = dx * cos + dy * sin + src_cx;
        let sy = -dx * sin + dy * cos + src_cy;
        sample_bilinear(image, sx - 0.5, sy - 0.5)
    })
}

fn sample_bilinear(image: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let (w, h) = image.dimensions();
    if x < -0.5 || y < -0.5 || x > f64::from(w) - 0.5 || y > f64::from(h) - 0.5 {
        return TRANSPARENT;
    }
    let max_x = i64::from(w) - 1;
    let max_y = i64::from(h) - 1;
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let at = |px: f64, py: f64| {
        let cx = (px as i64).clamp(0, max_x) as u32;
        let cy = (py as i64).clamp(0, max_y) as u32;
        image.get_pixel(cx, cy).0
    };
    let tl = at(x0, y0);
    let tr = at(x0 + 1.0, y0);
    let bl = at(x0, y0 + 1.0);
    let br = at(x0 + 1.0, y0 + 1.0);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = f64::from(tl[c]) * (1.0 - fx) + f64::from(tr[c]) * fx;
        let bottom = f64::from(bl[c]) * (1.0 - fx) + f64::from(br[c]) * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}

/// Resample to `width` x `height` with SIMD-accelerated convolution.
pub fn resize(image: &RgbaImage, width: u32, height: u32) -> Result<RgbaImage> {
    use fast_image_resize as fr;
    use fr::images::Image;

    let (w, h) = image.dimensions();
    if (w, h) == (width, height) {
        return Ok(image.clone());
    }
    if w == 0 || h == 0 || width == 0 || height == 0 {
        return Err(PipelineError::InvalidFrame(format!(
            "cannot resize {w}x{h} to {width}x{height}"
        )));
    }

    let src = Image::from_vec_u8(w, h, image.as_raw().clone(), fr::PixelType::U8x4)
        .map_err(|e| PipelineError::InvalidFrame(e.to_string()))?;
    let mut dst = Image::new(width, height, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new();
    resizer
        .resize(&src, &mut dst, None)
        .map_err(|e| PipelineError::InvalidFrame(format!("resize failed: {e}")))?;

    RgbaImage::from_raw(width, height, dst.into_vec())
        .ok_or_else(|| PipelineError::InvalidFrame("resized buffer size mismatch".to_string()))
}

/// Copy out a rectangle, clipped to the image bounds.
pub fn crop(image: &RgbaImage, rect: PixelRect) -> RgbaImage {
    let (w, h) = image.dimensions();
    let x = rect.x.min(w);
    let y = rect.y.min(h);
    let width = rect.width.min(w - x);
    let height = rect.height.min(h - y);
    imageops::crop_imm(image, x, y, width, height).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 7, 255]))
    }

    #[test]
    fn horizontal_flip_mirrors_columns() {
        let image = make_image(4, 2);
        let out = flip(&image, FlipDirection::Horizontal);
        assert_eq!(out.get_pixel(0, 0).0[0], 3);
        assert_eq!(out.get_pixel(3, 1).0[0], 0);
    }

    #[test]
    fn vertical_flip_mirrors_rows() {
        let image = make_image(2, 4);
        let out = flip(&image, FlipDirection::Vertical);
        assert_eq!(out.get_pixel(0, 0).0[1], 3);
    }

    #[test]
    fn double_flip_is_identity() {
        let image = make_image(5, 3);
        let twice = flip(&flip(&image, FlipDirection::Vertical), FlipDirection::Vertical);
        assert_eq!(twice, image);
    }

    #[test]
    fn quarter_turn_swaps_dimensions_clockwise() {
        let image = make_image(4, 2);
        let out = rotate(&image, 90.0);
        assert_eq!(out.dimensions(), (2, 4));
        // Top-left of the source ends up top-right.
        assert_eq!(out.get_pixel(1, 0).0[..2], [0, 0]);
    }

    #[test]
    fn negative_quarter_turn_is_counter_clockwise() {
        let image = make_image(4, 2);
        assert_eq!(rotate(&image, -90.0), imageops::rotate270(&image));
    }

    #[test]
    fn full_turns_are_identity() {
        let image = make_image(3, 3);
        assert_eq!(rotate(&image, 360.0), image);
        assert_eq!(rotate(&image, 0.0), image);
    }

    #[test]
    fn half_turn_keeps_dimensions() {
        let image = make_image(6, 3);
        let out = rotate(&image, 180.0);
        assert_eq!(out.dimensions(), (6, 3));
        assert_eq!(out.get_pixel(0, 0).0[..2], [5, 2]);
    }

    #[test]
    fn oblique_rotation_swaps_canvas_and_fills_transparent() {
        let image = RgbaImage::from_pixel(40, 20, Rgba([255, 0, 0, 255]));
        let out = rotate(&image, 45.0);
        assert_eq!(out.dimensions(), (20, 40));
        assert_eq!(out.get_pixel(0, 0).0[3], 0);
        assert_eq!(out.get_pixel(10, 20).0, [255, 0, 0, 255]);
    }

    #[test]
    fn rotate_within_keeps_canvas_size() {
        let image = RgbaImage::from_pixel(40, 20, Rgba([255, 0, 0, 255]));
        let out = rotate_within(&image, 90.0);
        assert_eq!(out.dimensions(), (40, 20));
        assert_eq!(out.get_pixel(20, 10).0, [255, 0, 0, 255]);
        // The rotated content is only 20 wide, so the left edge is uncovered.
        assert_eq!(out.get_pixel(0, 0).0[3], 0);

        assert_eq!(rotate_within(&image, 45.0).dimensions(), (40, 20));
        assert_eq!(rotate_within(&image, 360.0), image);
    }

    #[test]
    fn resize_produces_requested_dimensions() {
        let image = make_image(1920 / 8, 1080 / 8);
        let out = resize(&image, 160, 120).unwrap();
        assert_eq!(out.dimensions(), (160, 120));
    }

    #[test]
    fn resize_of_uniform_image_keeps_colour() {
        let image = RgbaImage::from_pixel(64, 48, Rgba([10, 200, 90, 255]));
        let out = resize(&image, 20, 15).unwrap();
        for p in out.pixels() {
            for (got, want) in p.0.iter().zip([10u8, 200, 90, 255]) {
                assert!(got.abs_diff(want) <= 1, "{p:?}");
            }
        }
    }

    #[test]
    fn resize_to_same_size_is_a_copy() {
        let image = make_image(7, 5);
        assert_eq!(resize(&image, 7, 5).unwrap(), image);
    }

    #[test]
    fn resize_rejects_empty_target() {
        assert!(resize(&make_image(4, 4), 0, 4).is_err());
    }

    #[test]
    fn crop_extracts_requested_rect() {
        let image = make_image(640, 480);
        let out = crop(
            &image,
            PixelRect {
                x: 50,
                y: 50,
                width: 100,
                height: 70,
            },
        );
        assert_eq!(out.dimensions(), (100, 70));
        assert_eq!(out.get_pixel(0, 0).0[..2], [50, 50]);
    }

    #[test]
    fn crop_is_clipped_to_bounds() {
        let image = make_image(10, 10);
        let out = crop(
            &image,
            PixelRect {
                x: 8,
                y: 8,
                width: 5,
                height: 5,
            },
        );
        assert_eq!(out.dimensions(), (2, 2));
    }
}
