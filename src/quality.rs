//! Frame quality checks: lighting analysis and blur/exposure gates.

use image::RgbaImage;
use serde::Serialize;

use crate::augment::geometric;
use crate::error::Result;
use crate::source::Frame;

/// Gate frames are downsampled to this size before measuring.
const GATE_WIDTH: u32 = 160;
const GATE_HEIGHT: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LightingStatus {
    Good,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LightingWarning {
    LowBrightness,
    HighBrightness,
    TooManyDarkAreas,
    TooManyBrightAreas,
    LowContrast,
    HighContrast,
}

impl LightingWarning {
    pub fn message(&self) -> &'static str {
        match self {
            Self::LowBrightness => "Low overall brightness",
            Self::HighBrightness => "High overall brightness",
            Self::TooManyDarkAreas => "Too many dark areas",
            Self::TooManyBrightAreas => "Too many bright areas",
            Self::LowContrast => "Low contrast",
            Self::HighContrast => "High contrast",
        }
    }
}

/// Luminance statistics of a frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LightingReport {
    pub status: LightingStatus,
    /// Mean luminance, 0-255.
    pub brightness: f64,
    /// Standard deviation of luminance.
    pub contrast: f64,
    /// Percentage of pixels with luminance below 50.
    pub shadows: f64,
    /// Percentage of pixels with luminance above 200.
    pub highlights: f64,
    pub warnings: Vec<LightingWarning>,
}

/// Result of the blur and exposure gates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityGates {
    pub mean: f64,
    pub variance: f64,
    /// Mean luminance below 35 or above 220.
    pub exposure_warning: bool,
    /// Luminance variance below 400.
    pub blur_warning: bool,
}

impl QualityGates {
    pub fn passed(&self) -> bool {
        !self.exposure_warning && !self.blur_warning
    }
}

/// Both checks for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameAssessment {
    pub lighting: LightingReport,
    pub gates: QualityGates,
}

fn luma(p: &image::Rgba<u8>) -> f64 {
    0.299 * f64::from(p.0[0]) + 0.587 * f64::from(p.0[1]) + 0.114 * f64::from(p.0[2])
}

/// Measure brightness, contrast and clipped areas.
pub fn analyze_lighting(image: &RgbaImage) -> LightingReport {
    let n = f64::from(image.width()) * f64::from(image.height());
    if n == 0.0 {
        return LightingReport {
            status: LightingStatus::Good,
            brightness: 0.0,
            contrast: 0.0,
            shadows: 0.0,
            highlights: 0.0,
            warnings: Vec::new(),
        };
    }

    let (mut sum, mut dark, mut bright) = (0.0, 0u64, 0u64);
    for p in image.pixels() {
        let l = luma(p);
        sum += l;
        if l < 50.0 {
            dark += 1;
        }
        if l > 200.0 {
            bright += 1;
        }
    }
    let brightness = sum / n;
    let contrast = (image
        .pixels()
        .map(|p| (luma(p) - brightness).powi(2))
        .sum::<f64>()
        / n)
        .sqrt();
    let shadows = dark as f64 / n * 100.0;
    let highlights = bright as f64 / n * 100.0;

    let mut warnings = Vec::new();
    if brightness < 80.0 {
        warnings.push(LightingWarning::LowBrightness);
    } else if brightness > 180.0 {
        warnings.push(LightingWarning::HighBrightness);
    }
    if shadows > 30.0 {
        warnings.push(LightingWarning::TooManyDarkAreas);
    }
    if highlights > 40.0 {
        warnings.push(LightingWarning::TooManyBrightAreas);
    }
    if contrast < 30.0 {
        warnings.push(LightingWarning::LowContrast);
    } else if contrast > 80.0 {
        warnings.push(LightingWarning::HighContrast);
    }

    let status = match warnings.len() {
        0 => LightingStatus::Good,
        1 | 2 => LightingStatus::Warning,
        _ => LightingStatus::Critical,
    };

    LightingReport {
        status,
        brightness,
        contrast,
        shadows,
        highlights,
        warnings,
    }
}

/// Downsample to 160x120 and flag under/over-exposure and blur.
pub fn check_gates(image: &RgbaImage) -> Result<QualityGates> {
    let small = geometric::resize(image, GATE_WIDTH, GATE_HEIGHT)?;
    let n = f64::from(GATE_WIDTH * GATE_HEIGHT);
    let (sum, sum_sq) = small.pixels().fold((0.0, 0.0), |(s, sq), p| {
        let l = luma(p);
        (s + l, sq + l * l)
    });
    let mean = sum / n;
    let variance = sum_sq / n - mean * mean;
    Ok(QualityGates {
        mean,
        variance,
        exposure_warning: !(35.0..=220.0).contains(&mean),
        blur_warning: variance < 400.0,
    })
}

/// Run both checks on a source frame.
pub fn assess_frame(frame: &Frame) -> Result<FrameAssessment> {
    let image = frame.to_image()?;
    Ok(FrameAssessment {
        lighting: analyze_lighting(&image),
        gates: check_gates(&image)?,
    })
}
