use image::RgbaImage;

use crate::augment::convolution;
use crate::augment::photometric::{apply_color_ops, contrast_factor, ColorOp};
use crate::augment::Effect;

/// One stage of the composed preview filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterStage {
    Color(ColorOp),
    Blur(u32),
}

/// Fast-path effects folded into a single chained filter.
///
/// Consecutive colour stages share one pass over the buffer; a blur splits
/// the chain because it needs its neighbours.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterChain {
    stages: Vec<FilterStage>,
}

impl FilterChain {
    /// Keep the fast-path effects from `effects`, in their given order.
    pub fn from_effects(effects: &[Effect]) -> Self {
        let stages = effects
            .iter()
            .filter(|effect| !effect.is_identity())
            .filter_map(|effect| match *effect {
                Effect::Brightness(f) => Some(FilterStage::Color(ColorOp::Brightness(f))),
                Effect::Contrast(v) => Some(FilterStage::Color(ColorOp::Contrast(v))),
                Effect::Saturation(f) => Some(FilterStage::Color(ColorOp::Saturation(f))),
                Effect::Hue(deg) => Some(FilterStage::Color(ColorOp::Hue(deg))),
                Effect::Blur(r) => Some(FilterStage::Blur(r)),
                _ => None,
            })
            .collect();
        Self { stages }
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stages(&self) -> &[FilterStage] {
        &self.stages
    }

    /// CSS-style description, e.g. `brightness(1.2) blur(2px)`.
    pub fn describe(&self) -> String {
        if self.stages.is_empty() {
            return "none".to_string();
        }
        self.stages
            .iter()
            .map(|stage| match *stage {
                FilterStage::Color(ColorOp::Brightness(f)) => format!("brightness({f})"),
                FilterStage::Color(ColorOp::Contrast(v)) => {
                    format!("contrast({:.3})", contrast_factor(v))
                }
                FilterStage::Color(ColorOp::Saturation(f)) => format!("saturate({f})"),
                FilterStage::Color(ColorOp::Hue(deg)) => format!("hue-rotate({deg}deg)"),
                FilterStage::Blur(r) => format!("blur({r}px)"),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn apply(&self, image: &RgbaImage) -> RgbaImage {
        let mut out = image.clone();
        let mut pending: Vec<ColorOp> = Vec::new();
        for stage in &self.stages {
            match *stage {
                FilterStage::Color(op) => pending.push(op),
                FilterStage::Blur(r) => {
                    if !pending.is_empty() {
                        out = apply_color_ops(&out, &pending);
                        pending.clear();
                    }
                    out = convolution::box_blur(&out, r);
                }
            }
        }
        if !pending.is_empty() {
            out = apply_color_ops(&out, &pending);
        }
        out
    }
}
