use std::time::Duration;

use crate::config::CaptureConfig;
use crate::error::{PipelineError, Result};

use super::CapturedImage;

/// A validated burst request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstJob {
    pub count: u32,
    pub interval: Duration,
}

impl BurstJob {
    /// Check `count` and `interval_ms` against the configured bounds.
    pub fn new(count: u32, interval_ms: u64, config: &CaptureConfig) -> Result<Self> {
        if !(config.burst_count_min..=config.burst_count_max).contains(&count) {
            return Err(PipelineError::Validation(format!(
                "burst count {count} outside [{}, {}]",
                config.burst_count_min, config.burst_count_max
            )));
        }
        if !(config.burst_interval_min_ms..=config.burst_interval_max_ms).contains(&interval_ms) {
            return Err(PipelineError::Validation(format!(
                "burst interval {interval_ms}ms outside [{}, {}]",
                config.burst_interval_min_ms, config.burst_interval_max_ms
            )));
        }
        Ok(Self {
            count,
            interval: Duration::from_millis(interval_ms),
        })
    }
}

/// Outcome of a burst that was allowed to start.
#[derive(Debug)]
pub struct BurstReport {
    pub requested: u32,
    /// Images delivered, in capture order.
    pub images: Vec<CapturedImage>,
    /// Another burst or capture was running; nothing was taken.
    pub skipped: bool,
    /// Stopped early by `abort_burst`.
    pub aborted: bool,
    /// The failure that halted the burst, if any.
    pub error: Option<PipelineError>,
}

impl BurstReport {
    pub(crate) fn new(requested: u32) -> Self {
        Self {
            requested,
            images: Vec::new(),
            skipped: false,
            aborted: false,
            error: None,
        }
    }

    pub(crate) fn skipped(requested: u32) -> Self {
        Self {
            skipped: true,
            ..Self::new(requested)
        }
    }

    /// Every requested image was captured.
    pub fn is_complete(&self) -> bool {
        self.images.len() == self.requested as usize
    }
}
