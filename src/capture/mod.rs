//! Capture controller: single, burst and augmented captures.
//!
//! A capture takes the current frame (the preview overlay when the preview is
//! showing one), crops it to the ROI, applies the requested effects and then
//! the active preset, encodes it and hands it to the [`CaptureSink`].

pub mod burst;
pub mod sink;

pub use burst::{BurstJob, BurstReport};
pub use sink::{CallbackSink, CaptureCallback, CaptureSink};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use image::RgbaImage;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::augment::codec::{self, EncodedImage, OutputFormat};
use crate::augment::{geometric, AugmentationParams, Effect, EffectId, RandomAugmentation};
use crate::config::CaptureConfig;
use crate::error::{PipelineError, Result};
use crate::preset::Preset;
use crate::preview::PreviewRenderer;
use crate::roi::Size;
use crate::session::Session;
use crate::source::FrameSource;

/// A finished, encoded capture.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub class_name: String,
    pub captured_at: DateTime<Utc>,
    pub width: u32,
    pub height: u32,
}

/// Metadata handed to dataset stores alongside the bytes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureMetadata {
    pub class_name: String,
    pub timestamp: String,
    pub width: u32,
    pub height: u32,
}

impl CapturedImage {
    /// RFC 3339 timestamp with millisecond precision.
    pub fn timestamp_iso(&self) -> String {
        self.captured_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// `data:<mime>;base64,...` form of the bytes.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            STANDARD.encode(&self.bytes)
        )
    }

    pub fn metadata(&self) -> CaptureMetadata {
        CaptureMetadata {
            class_name: self.class_name.clone(),
            timestamp: self.timestamp_iso(),
            width: self.width,
            height: self.height,
        }
    }
}

/// Clears its flag on drop.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool, what: &'static str) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| PipelineError::Busy(what))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Orchestrates captures for one session.
pub struct CaptureController {
    session: Arc<Session>,
    source: Arc<dyn FrameSource>,
    preview: Option<Arc<PreviewRenderer>>,
    sink: Arc<dyn CaptureSink>,
    config: CaptureConfig,
    capturing: AtomicBool,
    bursting: AtomicBool,
    abort: AtomicBool,
    rng: Mutex<StdRng>,
}

impl CaptureController {
    pub fn new(
        session: Arc<Session>,
        source: Arc<dyn FrameSource>,
        sink: Arc<dyn CaptureSink>,
        config: CaptureConfig,
    ) -> Self {
        Self {
            session,
            source,
            preview: None,
            sink,
            config,
            capturing: AtomicBool::new(false),
            bursting: AtomicBool::new(false),
            abort: AtomicBool::new(false),
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Capture from the preview overlay whenever it is showing one.
    pub fn with_preview(mut self, preview: Arc<PreviewRenderer>) -> Self {
        self.preview = Some(preview);
        self
    }

    /// Seed the generator used by noise and random augmentation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::Acquire)
    }

    pub fn is_bursting(&self) -> bool {
        self.bursting.load(Ordering::Acquire)
    }

    /// Capture the current frame once.
    ///
    /// Returns `Ok(None)` without capturing when another capture or a burst
    /// is running.
    pub async fn capture_single(&self) -> Result<Option<CapturedImage>> {
        self.guarded_capture(&[]).await
    }

    /// Capture once, apply `effect_ids` in the given order with `params`,
    /// then the active preset.
    pub async fn capture_burst_with_augmentation(
        &self,
        effect_ids: &[EffectId],
        params: &AugmentationParams,
    ) -> Result<Option<CapturedImage>> {
        let effects: Vec<Effect> = effect_ids.iter().map(|id| params.effect(*id)).collect();
        self.guarded_capture(&effects).await
    }

    /// Capture once with a freshly drawn random combination of effects.
    pub async fn capture_random(&self, random: &RandomAugmentation) -> Result<Option<CapturedImage>> {
        let effects = random.sample(&mut *self.rng.lock());
        self.guarded_capture(&effects).await
    }

    /// Take `count` captures `interval_ms` apart.
    ///
    /// Parameters are validated before the first frame is taken. A failing
    /// capture stops the burst; images already delivered are kept and the
    /// error is reported in the returned [`BurstReport`].
    pub async fn capture_burst(&self, count: u32, interval_ms: u64) -> Result<BurstReport> {
        let job = BurstJob::new(count, interval_ms, &self.config)?;

        let Ok(_bursting) = BusyGuard::acquire(&self.bursting, "burst in progress") else {
            tracing::debug!("Burst requested while another is running, skipping");
            return Ok(BurstReport::skipped(count));
        };
        let Ok(_capturing) = BusyGuard::acquire(&self.capturing, "capture in progress") else {
            tracing::debug!("Burst requested during a capture, skipping");
            return Ok(BurstReport::skipped(count));
        };
        self.abort.store(false, Ordering::Release);

        tracing::info!("Burst started: {} frames every {:?}", job.count, job.interval);
        let mut report = BurstReport::new(job.count);
        for i in 0..job.count {
            if i > 0 {
                tokio::time::sleep(job.interval).await;
            }
            if self.abort.swap(false, Ordering::AcqRel) {
                tracing::info!("Burst aborted after {i} of {} frames", job.count);
                report.aborted = true;
                break;
            }
            match self.capture_once(&[]) {
                Ok(image) => {
                    self.sink.deliver(image.clone());
                    report.images.push(image);
                }
                Err(e) => {
                    tracing::warn!("Burst halted at frame {}: {e}", i + 1);
                    report.error = Some(e);
                    break;
                }
            }
        }
        tracing::info!(
            "Burst finished: {}/{} frames",
            report.images.len(),
            job.count
        );
        Ok(report)
    }

    /// Ask a running burst to stop before its next frame.
    pub fn abort_burst(&self) {
        if self.is_bursting() {
            self.abort.store(true, Ordering::Release);
        }
    }

    /// Apply every non-identity entry of `preset`, keeping the image's format.
    pub fn apply_preset_to_image(&self, image: &EncodedImage, preset: &Preset) -> Result<EncodedImage> {
        let effects = preset.effects();
        if effects.is_empty() {
            return Ok(image.clone());
        }
        let decoded = image.decode()?;
        let out = preset.apply(decoded, &mut *self.rng.lock());
        codec::encode(&out, image.format)
    }

    async fn guarded_capture(&self, effects: &[Effect]) -> Result<Option<CapturedImage>> {
        if self.is_bursting() {
            tracing::debug!("Capture requested during a burst, skipping");
            return Ok(None);
        }
        let _guard = match BusyGuard::acquire(&self.capturing, "capture in progress") {
            Ok(guard) => guard,
            Err(e) => {
                tracing::debug!("Skipping capture: {e}");
                return Ok(None);
            }
        };
        let image = self.capture_once(effects)?;
        self.sink.deliver(image.clone());
        Ok(Some(image))
    }

    fn capture_once(&self, effects: &[Effect]) -> Result<CapturedImage> {
        let image = self.grab()?;
        let image = self.crop_to_roi(image)?;

        let mut rng = self.rng.lock();
        let mut image = effects
            .iter()
            .filter(|effect| !effect.is_identity())
            .fold(image, |img, effect| effect.apply(&img, &mut *rng));
        if let Some(preset) = self.session.active_preset() {
            image = preset.apply(image, &mut *rng);
        }
        drop(rng);

        let encoded = codec::encode(&image, self.config.format)?;
        Ok(CapturedImage {
            bytes: encoded.bytes,
            format: encoded.format,
            class_name: self.session.class_name(),
            captured_at: Utc::now(),
            width: encoded.width,
            height: encoded.height,
        })
    }

    /// The preview overlay when one is showing, otherwise the source frame.
    fn grab(&self) -> Result<RgbaImage> {
        if let Some(overlay) = self.preview.as_ref().and_then(|p| p.overlay()) {
            return Ok(overlay.image.clone());
        }
        self.source.snapshot()?.to_image()
    }

    fn crop_to_roi(&self, image: RgbaImage) -> Result<RgbaImage> {
        let Some(roi) = self.session.roi() else {
            return Ok(image);
        };
        let viewport: Size = self.session.viewport();
        let rect = roi.to_pixel_rect(viewport, image.width(), image.height());
        if rect.is_empty() {
            return Err(PipelineError::Validation(format!(
                "ROI {roi:?} maps to an empty region of a {}x{} frame",
                image.width(),
                image.height()
            )));
        }
        Ok(geometric::crop(&image, rect))
    }
}
