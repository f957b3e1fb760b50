//! Live preview: composites the latest frame with the active augmentations.
//!
//! ```text
//! frame source ──▶ scale to viewport ──▶ flip/rotate ──▶ FilterChain ──▶ noise ──▶ sharpen ──▶ overlay
//! ```
//!
//! [`PreviewRenderer::tick`] does one throttled step and is usable without a
//! runtime. [`PreviewRenderer::start`] drives it from a tokio task.

pub mod filter;
pub mod stats;

pub use filter::FilterChain;
pub use stats::{RenderSnapshot, RenderStats};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use image::RgbaImage;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::augment::{convolution, geometric, photometric, Effect};
use crate::config::PreviewConfig;
use crate::error::Result;
use crate::session::Session;
use crate::source::FrameSource;

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Preview is off; nothing was drawn.
    Disabled,
    /// Too soon after the previous tick.
    Throttled,
    /// No effect or transform active; overlay cleared.
    Idle,
    /// Source had no frame to draw.
    NoFrame,
    /// A new overlay was committed.
    Rendered,
}

/// A rendered preview buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub image: RgbaImage,
    /// Timestamp of the source frame it was drawn from.
    pub source_timestamp_us: u64,
    /// The composed fast-path filter, CSS-style.
    pub filter: String,
}

struct RenderState {
    last_tick: Option<Instant>,
    overlay: Option<Arc<Overlay>>,
}

/// Throttled renderer for the augmentation preview.
pub struct PreviewRenderer {
    session: Arc<Session>,
    source: Arc<dyn FrameSource>,
    config: PreviewConfig,
    enabled: AtomicBool,
    state: Mutex<RenderState>,
    stats: Mutex<RenderStats>,
    rng: Mutex<StdRng>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PreviewRenderer {
    pub fn new(session: Arc<Session>, source: Arc<dyn FrameSource>, config: PreviewConfig) -> Self {
        Self::with_rng(session, source, config, StdRng::from_os_rng())
    }

    /// Use a seeded generator for the noise pass.
    pub fn with_seed(
        session: Arc<Session>,
        source: Arc<dyn FrameSource>,
        config: PreviewConfig,
        seed: u64,
    ) -> Self {
        Self::with_rng(session, source, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        session: Arc<Session>,
        source: Arc<dyn FrameSource>,
        config: PreviewConfig,
        rng: StdRng,
    ) -> Self {
        Self {
            session,
            source,
            config,
            enabled: AtomicBool::new(false),
            state: Mutex::new(RenderState {
                last_tick: None,
                overlay: None,
            }),
            stats: Mutex::new(RenderStats::new()),
            rng: Mutex::new(rng),
            task: Mutex::new(None),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Flip the preview toggle without touching the background task.
    ///
    /// Turning it off clears the overlay under the commit lock, so no
    /// overlay is visible once this returns.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
        if !enabled {
            let mut state = self.state.lock();
            state.overlay = None;
            state.last_tick = None;
        }
    }

    /// The current overlay, if the preview is on and has drawn one.
    pub fn overlay(&self) -> Option<Arc<Overlay>> {
        if !self.is_enabled() {
            return None;
        }
        self.state.lock().overlay.clone()
    }

    pub fn stats(&self) -> RenderSnapshot {
        self.stats.lock().snapshot()
    }

    /// Run one step of the loop at time `now`.
    pub fn tick(&self, now: Instant) -> Result<TickOutcome> {
        if !self.is_enabled() {
            return Ok(TickOutcome::Disabled);
        }
        {
            let mut state = self.state.lock();
            if let Some(last) = state.last_tick {
                if now.saturating_duration_since(last) < self.config.throttle() {
                    self.stats.lock().record_throttled();
                    return Ok(TickOutcome::Throttled);
                }
            }
            state.last_tick = Some(now);
        }

        let active = self.session.augmentations();
        if !active.is_active() {
            self.state.lock().overlay = None;
            self.stats.lock().record_idle();
            return Ok(TickOutcome::Idle);
        }

        let frame = match self.source.snapshot() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!("Preview tick skipped: {e}");
                return Ok(TickOutcome::NoFrame);
            }
        };

        let started = Instant::now();
        let viewport = self.session.viewport();
        let width = (viewport.width.round() as u32).max(1);
        let height = (viewport.height.round() as u32).max(1);

        let mut image = geometric::resize(&frame.to_image()?, width, height)?;
        // The canvas stays viewport-sized so ROI coordinates map 1:1.
        for transform in active.transforms() {
            image = match transform {
                Effect::Flip(direction) => geometric::flip(&image, direction),
                Effect::Rotate(degrees) => geometric::rotate_within(&image, degrees),
                other => other.apply(&image, &mut *self.rng.lock()),
            };
        }

        let effects = active.pixel_effects();
        let chain = FilterChain::from_effects(&effects);
        if !chain.is_empty() {
            image = chain.apply(&image);
        }
        for effect in &effects {
            if let Effect::Noise(intensity) = *effect {
                image = photometric::add_noise(&image, intensity, &mut *self.rng.lock());
            }
        }
        for effect in &effects {
            if let Effect::Sharpen(intensity) = *effect {
                image = convolution::sharpen(&image, intensity);
            }
        }

        let overlay = Overlay {
            image,
            source_timestamp_us: frame.timestamp_us,
            filter: chain.describe(),
        };

        let mut state = self.state.lock();
        if !self.is_enabled() {
            return Ok(TickOutcome::Disabled);
        }
        state.overlay = Some(Arc::new(overlay));
        drop(state);

        self.stats.lock().record_render(started.elapsed());
        Ok(TickOutcome::Rendered)
    }

    /// Enable the preview and spawn the render loop on the current runtime.
    ///
    /// Calling `start` while the loop is running does nothing. Outside a
    /// tokio runtime it logs a warning and leaves the preview disabled.
    pub fn start(self: &Arc<Self>) {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("Live preview not started: no tokio runtime on this thread");
            return;
        };
        self.stats.lock().reset();
        self.set_enabled(true);

        let renderer = Arc::clone(self);
        *task = Some(runtime.spawn(async move {
            let mut interval = tokio::time::interval(renderer.config.refresh());
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            while renderer.is_enabled() {
                interval.tick().await;
                if let Err(e) = renderer.tick(Instant::now()) {
                    tracing::warn!("Preview render failed: {e}");
                }
            }
        }));
        tracing::info!("Live preview started ({}ms throttle)", self.config.throttle_ms);
    }

    /// Disable the preview and cancel the scheduled tick.
    pub fn stop(&self) {
        self.set_enabled(false);
        if let Some(task) = self.task.lock().take() {
            task.abort();
            tracing::info!("Live preview stopped");
        }
    }
}

impl Drop for PreviewRenderer {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}
