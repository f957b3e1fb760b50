//! Real-time ROI selection, augmentation preview and capture for building
//! labelled image datasets from a live camera feed.
//!
//! ```text
//! pointer input ──▶ Session (ROI engine, active effects, preset)
//!                        │
//!          ┌─────────────┴─────────────┐
//!          ▼                           ▼
//!   PreviewRenderer              CaptureController ──▶ CaptureSink
//!          │                           │
//!          └──────────▶ augment ◀──────┘
//! ```
//!
//! The crate consumes an already running camera through [`FrameSource`] and
//! hands finished images to a [`CaptureSink`]; it does no storage or I/O of
//! its own beyond reading its configuration file.

pub mod augment;
pub mod capture;
pub mod config;
pub mod error;
pub mod preset;
pub mod preview;
pub mod quality;
pub mod roi;
pub mod session;
pub mod source;

pub use augment::codec::{EncodedImage, OutputFormat};
pub use augment::{AugmentationParams, Effect, EffectId, FlipDirection, RandomAugmentation};
pub use capture::{BurstReport, CaptureController, CaptureSink, CapturedImage};
pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use preset::{Preset, PresetStore};
pub use preview::{PreviewRenderer, TickOutcome};
pub use roi::{Point, Roi, RoiEngine, Size};
pub use session::Session;
pub use source::{Frame, FrameSource};
