use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::{Frame, FrameSource};

/// Interval between simulated frames (~30fps).
const FRAME_PERIOD_US: u64 = 33_333;

/// A fake camera for running the pipeline without hardware.
///
/// Every call to `frame()` yields a deterministic gradient test pattern:
/// red ramps left to right, green top to bottom, blue is constant.
///
/// [`DummySource::from_env`] builds one only when `DUMMY_CAMERA=1` is set.
pub struct DummySource {
    width: u32,
    height: u32,
    pattern: Arc<Frame>,
    counter: AtomicU64,
}

impl DummySource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pattern: Arc::new(test_pattern(width, height)),
            counter: AtomicU64::new(0),
        }
    }

    /// Whether the dummy camera is enabled via environment variable.
    pub fn is_enabled() -> bool {
        std::env::var("DUMMY_CAMERA").is_ok_and(|v| v == "1" || v == "true")
    }

    /// A dummy source when `DUMMY_CAMERA` is set, so hosts can run without hardware.
    pub fn from_env(width: u32, height: u32) -> Option<Self> {
        if !Self::is_enabled() {
            return None;
        }
        tracing::info!("Using dummy camera at {width}x{height}");
        Some(Self::new(width, height))
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl FrameSource for DummySource {
    fn is_ready(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    fn frame(&self) -> Option<Arc<Frame>> {
        if !self.is_ready() {
            return None;
        }
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        Some(Arc::new(Frame {
            data: self.pattern.data.clone(),
            width: self.width,
            height: self.height,
            timestamp_us: n * FRAME_PERIOD_US,
        }))
    }
}

/// Gradient RGBA test pattern.
fn test_pattern(width: u32, height: u32) -> Frame {
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            data.push((x * 255 / width.max(1)) as u8);
            data.push((y * 255 / height.max(1)) as u8);
            data.push(128);
            data.push(255);
        }
    }
    Frame {
        data,
        width,
        height,
        timestamp_us: 0,
    }
}
