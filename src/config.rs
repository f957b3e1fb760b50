//! Pipeline configuration loaded from a JSON file.
//!
//! Every field has a default, so a missing file or a partial file both yield
//! a usable configuration. Values are checked by [`PipelineConfig::validate`]
//! before the pipeline is built from them.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::augment::codec::OutputFormat;
use crate::error::{PipelineError, Result};

/// Top-level configuration for the preview, capture and ROI components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    pub preview: PreviewConfig,
    pub capture: CaptureConfig,
    pub roi: RoiConfig,
}

/// Live preview scheduling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreviewConfig {
    /// Minimum spacing between two rendered ticks.
    pub throttle_ms: u64,
    /// Scheduling period of the render loop.
    pub refresh_ms: u64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            throttle_ms: 100,
            refresh_ms: 16,
        }
    }
}

impl PreviewConfig {
    /// Throttle period, never below 1ms.
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms.max(1))
    }

    /// Loop period, never below 1ms; a zero period would stall the timer.
    pub fn refresh(&self) -> Duration {
        Duration::from_millis(self.refresh_ms.max(1))
    }
}

/// Capture encoding and burst limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CaptureConfig {
    pub format: OutputFormat,
    pub burst_count_min: u32,
    pub burst_count_max: u32,
    pub burst_interval_min_ms: u64,
    pub burst_interval_max_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            burst_count_min: 1,
            burst_count_max: 50,
            burst_interval_min_ms: 50,
            burst_interval_max_ms: 2000,
        }
    }
}

/// ROI geometry tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoiConfig {
    /// Smallest committed width and height, in on-screen pixels.
    pub min_size: f64,
    /// Half-size of the square hit area around each handle.
    pub handle_radius: f64,
    /// Fraction of the container left free on each side by `reset()`.
    pub reset_inset: f64,
}

impl Default for RoiConfig {
    fn default() -> Self {
        Self {
            min_size: 20.0,
            handle_radius: 12.0,
            reset_inset: 0.1,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file, returning defaults on a missing file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.preview.throttle_ms == 0 || self.preview.refresh_ms == 0 {
            return Err(PipelineError::Config(
                "preview periods must be non-zero".to_string(),
            ));
        }
        let c = &self.capture;
        if c.burst_count_min == 0 || c.burst_count_min > c.burst_count_max {
            return Err(PipelineError::Config(format!(
                "invalid burst count bounds [{}, {}]",
                c.burst_count_min, c.burst_count_max
            )));
        }
        if c.burst_interval_min_ms > c.burst_interval_max_ms {
            return Err(PipelineError::Config(format!(
                "invalid burst interval bounds [{}, {}]",
                c.burst_interval_min_ms, c.burst_interval_max_ms
            )));
        }
        if let OutputFormat::Jpeg { quality } = c.format {
            if !(1..=100).contains(&quality) {
                return Err(PipelineError::Config(format!(
                    "jpeg quality {quality} outside 1..=100"
                )));
            }
        }
        let r = &self.roi;
        if r.min_size <= 0.0 || r.handle_radius < 0.0 {
            return Err(PipelineError::Config(
                "roi sizes must be positive".to_string(),
            ));
        }
        if !(0.0..0.5).contains(&r.reset_inset) {
            return Err(PipelineError::Config(format!(
                "roi reset inset {} outside [0, 0.5)",
                r.reset_inset
            )));
        }
        Ok(())
    }
}
