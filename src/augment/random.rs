use image::RgbaImage;
use rand::Rng;

use super::{Effect, FlipDirection};

/// Number of candidate transforms a draw picks from.
const CANDIDATES: usize = 9;

/// Random combination of transforms with mild, dataset-friendly ranges.
///
/// Each call picks between `min_effects` and `max_effects` candidates
/// uniformly with replacement, so the same kind may be chosen twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomAugmentation {
    pub min_effects: usize,
    pub max_effects: usize,
}

impl Default for RandomAugmentation {
    fn default() -> Self {
        Self {
            min_effects: 2,
            max_effects: 4,
        }
    }
}

impl RandomAugmentation {
    /// Draw the effect list without touching any pixels.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Effect> {
        let max = self.max_effects.max(self.min_effects);
        let count = rng.random_range(self.min_effects..=max);
        (0..count)
            .map(|_| candidate(rng.random_range(0..CANDIDATES), rng))
            .collect()
    }

    /// Apply a freshly drawn combination, returning the image and what was applied.
    pub fn apply<R: Rng + ?Sized>(&self, image: &RgbaImage, rng: &mut R) -> (RgbaImage, Vec<Effect>) {
        let effects = self.sample(rng);
        let mut out = image.clone();
        for effect in &effects {
            out = effect.apply(&out, rng);
        }
        tracing::debug!("Random augmentation applied {} effects", effects.len());
        (out, effects)
    }
}

fn candidate<R: Rng + ?Sized>(index: usize, rng: &mut R) -> Effect {
    match index {
        0 => Effect::Flip(if rng.random_bool(0.5) {
            FlipDirection::Horizontal
        } else {
            FlipDirection::Vertical
        }),
        1 => Effect::Rotate(rng.random_range(0.0..360.0)),
        2 => Effect::Brightness(rng.random_range(0.8..1.2)),
        3 => Effect::Contrast(rng.random_range(-50.0..50.0)),
        4 => Effect::Saturation(rng.random_range(0.5..1.5)),
        5 => Effect::Noise(rng.random_range(0.0..0.2)),
        6 => Effect::Blur(rng.random_range(0.0..3.0_f64).round() as u32),
        7 => Effect::Hue(rng.random_range(-30.0..30.0)),
        _ => Effect::Sharpen(rng.random_range(0.0..0.5)),
    }
}
