use serde::Serialize;
use std::time::{Duration, Instant};

/// Counters for the live preview loop.
pub struct RenderStats {
    rendered_count: u64,
    throttled_count: u64,
    idle_count: u64,
    total_render_us: u64,
    last_render_us: u64,
    start_time: Instant,
}

/// Snapshot of render stats for serialisation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSnapshot {
    pub fps: f64,
    pub rendered_count: u64,
    pub throttled_count: u64,
    pub idle_count: u64,
    pub throttle_rate: f64,
    pub avg_render_ms: f64,
    pub last_render_ms: f64,
}

impl RenderStats {
    pub fn new() -> Self {
        Self {
            rendered_count: 0,
            throttled_count: 0,
            idle_count: 0,
            total_render_us: 0,
            last_render_us: 0,
            start_time: Instant::now(),
        }
    }

    /// Record a tick that produced an overlay, with the pixel work's cost.
    pub fn record_render(&mut self, cost: Duration) {
        let us = cost.as_micros() as u64;
        self.rendered_count += 1;
        self.total_render_us += us;
        self.last_render_us = us;
    }

    /// Record a tick skipped by the throttle.
    pub fn record_throttled(&mut self) {
        self.throttled_count += 1;
    }

    /// Record a tick with nothing to draw.
    pub fn record_idle(&mut self) {
        self.idle_count += 1;
    }

    /// Rendered overlays per second since the last reset.
    pub fn fps(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed < 0.001 {
            return 0.0;
        }
        self.rendered_count as f64 / elapsed
    }

    /// Share of ticks skipped by the throttle, as a percentage.
    pub fn throttle_rate(&self) -> f64 {
        let total = self.rendered_count + self.throttled_count + self.idle_count;
        if total == 0 {
            return 0.0;
        }
        (self.throttled_count as f64 / total as f64) * 100.0
    }

    /// Mean pixel-work cost per rendered tick in milliseconds.
    pub fn avg_render_ms(&self) -> f64 {
        if self.rendered_count == 0 {
            return 0.0;
        }
        self.total_render_us as f64 / self.rendered_count as f64 / 1000.0
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            fps: self.fps(),
            rendered_count: self.rendered_count,
            throttled_count: self.throttled_count,
            idle_count: self.idle_count,
            throttle_rate: self.throttle_rate(),
            avg_render_ms: self.avg_render_ms(),
            last_render_ms: self.last_render_us as f64 / 1000.0,
        }
    }
}

impl Default for RenderStats {
    fn default() -> Self {
        Self::new()
    }
}
