use image::RgbaImage;

use super::photometric::to_channel;

/// Separable box blur with kernel size `2*radius + 1`.
///
/// Runs a horizontal then a vertical pass, clamping sample coordinates to
/// the image edge. All four channels are averaged. The intermediate buffer
/// is stored as `u8`, so results round between passes.
pub fn box_blur(image: &RgbaImage, radius: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    if radius == 0 || width == 0 || height == 0 {
        return image.clone();
    }
    let horizontal = blur_pass(image, radius, Axis::X);
    blur_pass(&horizontal, radius, Axis::Y)
}

#[derive(Clone, Copy)]
enum Axis {
    X,
    Y,
}

fn blur_pass(src: &RgbaImage, radius: u32, axis: Axis) -> RgbaImage {
    let (width, height) = src.dimensions();
    let r = i64::from(radius);
    let kernel = (2 * r + 1) as f64;
    let mut out = RgbaImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let mut sum = [0u32; 4];
            for k in -r..=r {
                let (sx, sy) = match axis {
                    Axis::X => ((i64::from(x) + k).clamp(0, i64::from(width) - 1) as u32, y),
                    Axis::Y => (x, (i64::from(y) + k).clamp(0, i64::from(height) - 1) as u32),
                };
                let p = src.get_pixel(sx, sy).0;
                for (acc, c) in sum.iter_mut().zip(p) {
                    *acc += u32::from(c);
                }
            }
            out.get_pixel_mut(x, y).0 = sum.map(|s| to_channel(f64::from(s) / kernel));
        }
    }
    out
}

/// 3x3 sharpen: centre `1 + 4*intensity`, edge neighbours `-intensity`,
/// corners zero.
///
/// Samples come from the unmodified input. The one-pixel border and the
/// alpha channel are copied through unchanged.
pub fn sharpen(image: &RgbaImage, intensity: f64) -> RgbaImage {
    let mut out = image.clone();
    let (width, height) = image.dimensions();
    if intensity == 0.0 || width < 3 || height < 3 {
        return out;
    }
    let centre = 1.0 + 4.0 * intensity;

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let c = image.get_pixel(x, y).0;
            let n = image.get_pixel(x, y - 1).0;
            let s = image.get_pixel(x, y + 1).0;
            let w = image.get_pixel(x - 1, y).0;
            let e = image.get_pixel(x + 1, y).0;
            let px = out.get_pixel_mut(x, y);
            for ch in 0..3 {
                let neighbours =
                    f64::from(n[ch]) + f64::from(s[ch]) + f64::from(w[ch]) + f64::from(e[ch]);
                px.0[ch] = to_channel(centre * f64::from(c[ch]) - intensity * neighbours);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn blur_of_uniform_image_is_unchanged() {
        let image = RgbaImage::from_pixel(10, 10, Rgba([40, 80, 120, 255]));
        assert_eq!(box_blur(&image, 3), image);
    }

    #[test]
    fn blur_spreads_a_single_bright_pixel() {
        let mut image = RgbaImage::from_pixel(9, 9, Rgba([0, 0, 0, 255]));
        image.put_pixel(4, 4, Rgba([255, 255, 255, 255]));

        let out = box_blur(&image, 1);
        // 255 / 3 per pass, rounded in between: 85 then 28.
        assert_eq!(out.get_pixel(4, 4).0[0], 28);
        assert_eq!(out.get_pixel(3, 3).0[0], 28);
        assert_eq!(out.get_pixel(2, 4).0[0], 0);
    }

    #[test]
    fn blur_clamps_at_edges() {
        let image = RgbaImage::from_fn(5, 1, |x, _| Rgba([if x == 0 { 90 } else { 0 }, 0, 0, 255]));
        let out = box_blur(&image, 1);
        // Left neighbour of x=0 is x=0 itself: (90 + 90 + 0) / 3.
        assert_eq!(out.get_pixel(0, 0).0[0], 60);
    }

    #[test]
    fn blur_averages_alpha_too() {
        let mut image = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 0, 0]));
        image.put_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let out = box_blur(&image, 1);
        assert!(out.get_pixel(0, 0).0[3] > 0);
    }

    #[test]
    fn zero_radius_is_identity() {
        let image = RgbaImage::from_fn(4, 4, |x, y| Rgba([(x * 60) as u8, (y * 60) as u8, 0, 255]));
        assert_eq!(box_blur(&image, 0), image);
    }

    #[test]
    fn sharpen_keeps_border_pixels() {
        let image = RgbaImage::from_fn(6, 6, |x, y| Rgba([((x * y) * 7) as u8, 50, 200, 255]));
        let out = sharpen(&image, 1.0);
        for x in 0..6 {
            assert_eq!(out.get_pixel(x, 0), image.get_pixel(x, 0));
            assert_eq!(out.get_pixel(x, 5), image.get_pixel(x, 5));
        }
        for y in 0..6 {
            assert_eq!(out.get_pixel(0, y), image.get_pixel(0, y));
            assert_eq!(out.get_pixel(5, y), image.get_pixel(5, y));
        }
    }

    #[test]
    fn sharpen_boosts_local_contrast() {
        let mut image = RgbaImage::from_pixel(5, 5, Rgba([100, 100, 100, 255]));
        image.put_pixel(2, 2, Rgba([150, 150, 150, 255]));
        let out = sharpen(&image, 0.5);
        // 3 * 150 - 0.5 * 400 = 250
        assert_eq!(out.get_pixel(2, 2).0[0], 250);
        // Neighbour: 3 * 100 - 0.5 * (150 + 300) = 75
        assert_eq!(out.get_pixel(2, 1).0[0], 75);
    }

    #[test]
    fn sharpen_reads_from_unmodified_input() {
        let image = RgbaImage::from_fn(4, 3, |x, _| Rgba([(x * 50) as u8, 0, 0, 255]));
        let out = sharpen(&image, 1.0);
        // x=1: 5*50 - (0 + 100 + 50 + 50) = 50; x=2 must see the original 50 at x=1.
        assert_eq!(out.get_pixel(1, 1).0[0], 50);
        assert_eq!(out.get_pixel(2, 1).0[0], 100);
    }

    #[test]
    fn tiny_images_pass_through_sharpen() {
        let image = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 4]));
        assert_eq!(sharpen(&image, 1.0), image);
    }
}
