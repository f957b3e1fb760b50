//! Pixel-transform library.
//!
//! ```text
//! augment/
//! ├── codec.rs        → encoded bytes <-> RGBA buffers
//! ├── photometric.rs  → brightness, contrast, saturation, hue, noise
//! ├── convolution.rs  → box blur, sharpen
//! ├── geometric.rs    → flip, rotate, crop
//! └── random.rs       → random combination of the above
//! ```
//!
//! Every transform works on a decoded [`RgbaImage`] and returns a new buffer.
//! Parameters are clamped into each effect's documented range when an
//! [`Effect`] is built, so callers may pass raw slider or preset values.

pub mod codec;
pub mod convolution;
pub mod geometric;
pub mod photometric;
pub mod random;

use std::fmt;

use image::RgbaImage;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use codec::{EncodedImage, OutputFormat};

pub use random::RandomAugmentation;

/// Largest blur radius accepted; the box kernel grows linearly with it.
pub const MAX_BLUR_RADIUS: f64 = 50.0;

/// Scalar effects that can be toggled in the preview and stored in presets.
///
/// Declaration order is the fixed order in which preset entries are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectId {
    Brightness,
    Contrast,
    Saturation,
    Noise,
    Blur,
    Hue,
    Sharpen,
}

impl EffectId {
    /// All scalar effects in application order.
    pub const ALL: [EffectId; 7] = [
        Self::Brightness,
        Self::Contrast,
        Self::Saturation,
        Self::Noise,
        Self::Blur,
        Self::Hue,
        Self::Sharpen,
    ];

    /// Stable string ID used in preset settings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Brightness => "brightness",
            Self::Contrast => "contrast",
            Self::Saturation => "saturation",
            Self::Noise => "noise",
            Self::Blur => "blur",
            Self::Hue => "hue",
            Self::Sharpen => "sharpen",
        }
    }

    /// Parse a string ID back into an `EffectId`.
    pub fn from_str_id(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == s)
    }

    /// Inclusive range the parameter is clamped into.
    pub fn range(self) -> (f64, f64) {
        match self {
            Self::Brightness => (0.2, 3.0),
            Self::Contrast => (-photometric::CONTRAST_LIMIT, photometric::CONTRAST_LIMIT),
            Self::Saturation => (0.0, 3.0),
            Self::Noise => (0.0, 1.0),
            Self::Blur => (0.0, MAX_BLUR_RADIUS),
            Self::Hue => (-180.0, 180.0),
            Self::Sharpen => (0.0, 1.0),
        }
    }

    /// Parameter value for which the effect leaves the image unchanged.
    pub fn identity(self) -> f64 {
        match self {
            Self::Brightness | Self::Saturation => 1.0,
            _ => 0.0,
        }
    }

    /// Clamp a raw value into this effect's range. NaN maps to identity.
    pub fn clamp(self, value: f64) -> f64 {
        if value.is_nan() {
            return self.identity();
        }
        let (min, max) = self.range();
        value.clamp(min, max)
    }

    /// Whether `value` would produce an identity pass once clamped.
    pub fn is_identity_value(self, value: f64) -> bool {
        Effect::scalar(self, value).is_identity()
    }

    /// Effects the preview folds into its single composed filter.
    pub fn is_fast_path(self) -> bool {
        !matches!(self, Self::Noise | Self::Sharpen)
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mirror axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlipDirection {
    Horizontal,
    Vertical,
}

/// One transform with its parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    Brightness(f64),
    Contrast(f64),
    Saturation(f64),
    Noise(f64),
    Blur(u32),
    Hue(f64),
    Sharpen(f64),
    Flip(FlipDirection),
    Rotate(f64),
}

impl Effect {
    /// Build a scalar effect, clamping the value into its range.
    pub fn scalar(id: EffectId, value: f64) -> Self {
        let v = id.clamp(value);
        match id {
            EffectId::Brightness => Self::Brightness(v),
            EffectId::Contrast => Self::Contrast(v),
            EffectId::Saturation => Self::Saturation(v),
            EffectId::Noise => Self::Noise(v),
            EffectId::Blur => Self::Blur(v.round() as u32),
            EffectId::Hue => Self::Hue(v),
            EffectId::Sharpen => Self::Sharpen(v),
        }
    }

    /// The scalar effect ID, `None` for geometric transforms.
    pub fn id(&self) -> Option<EffectId> {
        match self {
            Self::Brightness(_) => Some(EffectId::Brightness),
            Self::Contrast(_) => Some(EffectId::Contrast),
            Self::Saturation(_) => Some(EffectId::Saturation),
            Self::Noise(_) => Some(EffectId::Noise),
            Self::Blur(_) => Some(EffectId::Blur),
            Self::Hue(_) => Some(EffectId::Hue),
            Self::Sharpen(_) => Some(EffectId::Sharpen),
            Self::Flip(_) | Self::Rotate(_) => None,
        }
    }

    pub fn is_identity(&self) -> bool {
        match *self {
            Self::Brightness(v) | Self::Saturation(v) => v == 1.0,
            Self::Contrast(v) | Self::Noise(v) | Self::Hue(v) | Self::Sharpen(v) => v == 0.0,
            Self::Blur(r) => r == 0,
            Self::Rotate(deg) => deg % 360.0 == 0.0,
            Self::Flip(_) => false,
        }
    }

    /// Apply to a decoded buffer. Only `Noise` draws from `rng`.
    pub fn apply<R: Rng + ?Sized>(&self, image: &RgbaImage, rng: &mut R) -> RgbaImage {
        match *self {
            Self::Brightness(f) => photometric::adjust_brightness(image, f),
            Self::Contrast(v) => photometric::adjust_contrast(image, v),
            Self::Saturation(f) => photometric::adjust_saturation(image, f),
            Self::Noise(i) => photometric::add_noise(image, i, rng),
            Self::Blur(r) => convolution::box_blur(image, r),
            Self::Hue(shift) => photometric::adjust_hue(image, shift),
            Self::Sharpen(i) => convolution::sharpen(image, i),
            Self::Flip(dir) => geometric::flip(image, dir),
            Self::Rotate(deg) => geometric::rotate(image, deg),
        }
    }

    /// Decode, transform and re-encode in `format`.
    pub fn apply_encoded<R: Rng + ?Sized>(
        &self,
        image: &EncodedImage,
        format: OutputFormat,
        rng: &mut R,
    ) -> Result<EncodedImage> {
        let decoded = image.decode()?;
        codec::encode(&self.apply(&decoded, rng), format)
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flip(dir) => write!(f, "flip({dir:?})"),
            Self::Rotate(deg) => write!(f, "rotate({deg}deg)"),
            Self::Blur(r) => write!(f, "blur({r}px)"),
            Self::Brightness(v)
            | Self::Contrast(v)
            | Self::Saturation(v)
            | Self::Noise(v)
            | Self::Hue(v)
            | Self::Sharpen(v) => {
                let id = self.id().map(EffectId::as_str).unwrap_or_default();
                write!(f, "{id}({v})")
            }
        }
    }
}

/// Apply `effects` in order, skipping identity passes.
pub fn apply_effects<R: Rng + ?Sized>(
    image: RgbaImage,
    effects: &[Effect],
    rng: &mut R,
) -> RgbaImage {
    effects
        .iter()
        .filter(|effect| !effect.is_identity())
        .fold(image, |img, effect| effect.apply(&img, rng))
}

/// Current value of every scalar effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentationParams {
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
    pub noise: f64,
    pub blur: f64,
    pub hue: f64,
    pub sharpen: f64,
}

impl Default for AugmentationParams {
    /// Slider starting points: neutral colour, mild noise/blur/sharpen.
    fn default() -> Self {
        Self {
            brightness: 1.0,
            contrast: 0.0,
            saturation: 1.0,
            noise: 0.1,
            blur: 2.0,
            hue: 0.0,
            sharpen: 0.5,
        }
    }
}

impl AugmentationParams {
    pub fn get(&self, id: EffectId) -> f64 {
        match id {
            EffectId::Brightness => self.brightness,
            EffectId::Contrast => self.contrast,
            EffectId::Saturation => self.saturation,
            EffectId::Noise => self.noise,
            EffectId::Blur => self.blur,
            EffectId::Hue => self.hue,
            EffectId::Sharpen => self.sharpen,
        }
    }

    /// Store a value, clamped into the effect's range.
    pub fn set(&mut self, id: EffectId, value: f64) {
        let v = id.clamp(value);
        match id {
            EffectId::Brightness => self.brightness = v,
            EffectId::Contrast => self.contrast = v,
            EffectId::Saturation => self.saturation = v,
            EffectId::Noise => self.noise = v,
            EffectId::Blur => self.blur = v,
            EffectId::Hue => self.hue = v,
            EffectId::Sharpen => self.sharpen = v,
        }
    }

    pub fn effect(&self, id: EffectId) -> Effect {
        Effect::scalar(id, self.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn make_image() -> RgbaImage {
        RgbaImage::from_fn(12, 9, |x, y| {
            Rgba([(x * 20) as u8, (y * 25) as u8, ((x + y) * 9) as u8, 255])
        })
    }

    #[test]
    fn ids_round_trip_through_strings() {
        for id in EffectId::ALL {
            assert_eq!(EffectId::from_str_id(id.as_str()), Some(id));
        }
        assert_eq!(EffectId::from_str_id("vignette"), None);
    }

    #[test]
    fn all_is_in_declaration_order() {
        let mut sorted = EffectId::ALL;
        sorted.sort();
        assert_eq!(sorted, EffectId::ALL);
    }

    #[test]
    fn scalar_clamps_into_range() {
        assert_eq!(Effect::scalar(EffectId::Brightness, 9.0), Effect::Brightness(3.0));
        assert_eq!(Effect::scalar(EffectId::Brightness, 0.0), Effect::Brightness(0.2));
        assert_eq!(Effect::scalar(EffectId::Noise, -1.0), Effect::Noise(0.0));
        assert_eq!(Effect::scalar(EffectId::Hue, 720.0), Effect::Hue(180.0));
    }

    #[test]
    fn contrast_at_singularity_is_clamped() {
        assert_eq!(
            Effect::scalar(EffectId::Contrast, 259.0),
            Effect::Contrast(photometric::CONTRAST_LIMIT)
        );
        assert_eq!(
            Effect::scalar(EffectId::Contrast, 1000.0),
            Effect::Contrast(photometric::CONTRAST_LIMIT)
        );
    }

    #[test]
    fn blur_radius_is_rounded() {
        assert_eq!(Effect::scalar(EffectId::Blur, 0.3), Effect::Blur(0));
        assert_eq!(Effect::scalar(EffectId::Blur, 1.5), Effect::Blur(2));
        assert_eq!(Effect::scalar(EffectId::Blur, 2.4), Effect::Blur(2));
    }

    #[test]
    fn nan_maps_to_identity() {
        assert!(Effect::scalar(EffectId::Saturation, f64::NAN).is_identity());
    }

    #[test]
    fn identity_values_are_detected() {
        for id in EffectId::ALL {
            assert!(id.is_identity_value(id.identity()), "{id} identity");
        }
        assert!(!EffectId::Brightness.is_identity_value(1.2));
        assert!(EffectId::Blur.is_identity_value(0.4));
    }

    #[test]
    fn identity_effects_leave_pixels_unchanged() {
        let image = make_image();
        let mut rng = StdRng::seed_from_u64(1);
        for id in EffectId::ALL {
            let out = Effect::scalar(id, id.identity()).apply(&image, &mut rng);
            assert_eq!(out, image, "{id} at identity changed pixels");
        }
    }

    #[test]
    fn apply_effects_skips_identity_passes() {
        let image = make_image();
        let mut rng = StdRng::seed_from_u64(1);
        let out = apply_effects(
            image.clone(),
            &[Effect::Brightness(1.0), Effect::Contrast(0.0)],
            &mut rng,
        );
        assert_eq!(out, image);
    }

    #[test]
    fn apply_encoded_round_trips_dimensions() {
        let image = make_image();
        let encoded = codec::encode(&image, OutputFormat::Png).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let rotated = Effect::Rotate(90.0)
            .apply_encoded(&encoded, OutputFormat::Png, &mut rng)
            .unwrap();
        assert_eq!((rotated.width, rotated.height), (9, 12));
    }

    #[test]
    fn apply_encoded_rejects_garbage() {
        let garbage = EncodedImage {
            bytes: vec![1, 2, 3, 4],
            format: OutputFormat::Png,
            width: 1,
            height: 1,
        };
        let mut rng = StdRng::seed_from_u64(3);
        let result = Effect::Brightness(1.5).apply_encoded(&garbage, OutputFormat::Png, &mut rng);
        assert!(matches!(result, Err(crate::error::PipelineError::Decode(_))));
    }

    #[test]
    fn params_set_clamps_and_get_reads_back() {
        let mut params = AugmentationParams::default();
        params.set(EffectId::Sharpen, 4.0);
        assert_eq!(params.get(EffectId::Sharpen), 1.0);
        params.set(EffectId::Hue, -45.0);
        assert_eq!(params.effect(EffectId::Hue), Effect::Hue(-45.0));
    }

    #[test]
    fn effect_display_names_the_transform() {
        assert_eq!(Effect::Brightness(1.2).to_string(), "brightness(1.2)");
        assert_eq!(Effect::Blur(3).to_string(), "blur(3px)");
    }
}
