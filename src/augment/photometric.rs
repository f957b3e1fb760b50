//! Per-pixel colour transforms.
//!
//! Each public function leaves alpha untouched and rounds results back into
//! `0..=255`. [`ColorOp`] exposes the same maths one pixel at a time so the
//! preview can fold several adjustments into a single pass.

use image::RgbaImage;
use rand::Rng;

/// Largest contrast magnitude; the contrast factor is singular at 259.
pub const CONTRAST_LIMIT: f64 = 258.0;

/// Rec.601 luma weights.
const LUMA: [f64; 3] = [0.299, 0.587, 0.114];

/// A channel-wise colour adjustment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorOp {
    Brightness(f64),
    Contrast(f64),
    Saturation(f64),
    /// Hue rotation in degrees.
    Hue(f64),
}

impl ColorOp {
    pub fn is_identity(&self) -> bool {
        match *self {
            Self::Brightness(f) | Self::Saturation(f) => f == 1.0,
            Self::Contrast(v) | Self::Hue(v) => v == 0.0,
        }
    }

    /// Precompute trigonometry and factors for repeated per-pixel use.
    pub fn prepare(&self) -> PreparedOp {
        match *self {
            Self::Brightness(f) => PreparedOp::Scale(f),
            Self::Contrast(v) => PreparedOp::Contrast(contrast_factor(v)),
            Self::Saturation(f) => PreparedOp::Saturate(f),
            Self::Hue(deg) => {
                let rad = deg.to_radians();
                PreparedOp::Rotate {
                    cos: rad.cos(),
                    sin: rad.sin(),
                }
            }
        }
    }
}

/// A [`ColorOp`] with its constants resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PreparedOp {
    Scale(f64),
    Contrast(f64),
    Saturate(f64),
    Rotate { cos: f64, sin: f64 },
}

impl PreparedOp {
    /// Transform one RGB triple.
    pub fn apply_px(&self, [r, g, b]: [u8; 3]) -> [u8; 3] {
        let (r, g, b) = (f64::from(r), f64::from(g), f64::from(b));
        match *self {
            Self::Scale(f) => [to_channel(r * f), to_channel(g * f), to_channel(b * f)],
            Self::Contrast(f) => {
                let c = |v: f64| to_channel(f * (v - 128.0) + 128.0);
                [c(r), c(g), c(b)]
            }
            Self::Saturate(f) => {
                let l = LUMA[0] * r + LUMA[1] * g + LUMA[2] * b;
                let s = |v: f64| to_channel(l + f * (v - l));
                [s(r), s(g), s(b)]
            }
            Self::Rotate { cos, sin } => rotate_hue([r / 255.0, g / 255.0, b / 255.0], cos, sin),
        }
    }
}

/// Contrast multiplier for `value` in `[-258, 258]`.
pub fn contrast_factor(value: f64) -> f64 {
    let v = value.clamp(-CONTRAST_LIMIT, CONTRAST_LIMIT);
    (259.0 * (v + 255.0)) / (255.0 * (259.0 - v))
}

/// Run `ops` in order over every pixel in one pass, clamping after each op.
pub fn apply_color_ops(image: &RgbaImage, ops: &[ColorOp]) -> RgbaImage {
    let prepared: Vec<PreparedOp> = ops
        .iter()
        .filter(|op| !op.is_identity())
        .map(ColorOp::prepare)
        .collect();
    let mut out = image.clone();
    if prepared.is_empty() {
        return out;
    }
    for px in out.pixels_mut() {
        let [r, g, b, a] = px.0;
        let rgb = prepared.iter().fold([r, g, b], |acc, op| op.apply_px(acc));
        px.0 = [rgb[0], rgb[1], rgb[2], a];
    }
    out
}

/// Multiply every colour channel by `factor`.
pub fn adjust_brightness(image: &RgbaImage, factor: f64) -> RgbaImage {
    apply_color_ops(image, &[ColorOp::Brightness(factor)])
}

/// Stretch channels away from mid-grey; `value` in `[-258, 258]`.
pub fn adjust_contrast(image: &RgbaImage, value: f64) -> RgbaImage {
    apply_color_ops(image, &[ColorOp::Contrast(value)])
}

/// Scale each channel's distance from the pixel's luminance.
pub fn adjust_saturation(image: &RgbaImage, factor: f64) -> RgbaImage {
    apply_color_ops(image, &[ColorOp::Saturation(factor)])
}

/// Rotate chroma in YUV space by `shift` degrees.
pub fn adjust_hue(image: &RgbaImage, shift: f64) -> RgbaImage {
    apply_color_ops(image, &[ColorOp::Hue(shift)])
}

/// Add uniform noise in `[-intensity*255, +intensity*255]`, drawn
/// independently for each colour channel.
pub fn add_noise<R: Rng + ?Sized>(image: &RgbaImage, intensity: f64, rng: &mut R) -> RgbaImage {
    let mut out = image.clone();
    if intensity <= 0.0 {
        return out;
    }
    let amplitude = intensity * 255.0;
    for px in out.pixels_mut() {
        for c in &mut px.0[..3] {
            let noise = (rng.random::<f64>() - 0.5) * 2.0 * amplitude;
            *c = to_channel(f64::from(*c) + noise);
        }
    }
    out
}

fn rotate_hue([r, g, b]: [f64; 3], cos: f64, sin: f64) -> [u8; 3] {
    let y = LUMA[0] * r + LUMA[1] * g + LUMA[2] * b;
    let u = -0.147 * r - 0.289 * g + 0.436 * b;
    let v = 0.615 * r - 0.515 * g - 0.100 * b;

    let u2 = u * cos - v * sin;
    let v2 = u * sin + v * cos;

    [
        to_channel((y + 1.140 * v2) * 255.0),
        to_channel((y - 0.395 * u2 - 0.581 * v2) * 255.0),
        to_channel((y + 2.032 * u2) * 255.0),
    ]
}

#[inline]
pub(crate) fn to_channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
