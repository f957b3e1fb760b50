// Frame sources: the camera side of the pipeline, consumed but not owned.

pub mod dummy;
pub mod ring;

use std::sync::Arc;

use image::RgbaImage;

use crate::error::{PipelineError, Result};

pub use dummy::DummySource;
pub use ring::FrameRing;

/// A single snapshot of the camera feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Raw pixel data (RGBA, row-major).
    pub data: Vec<u8>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Capture timestamp in microseconds.
    pub timestamp_us: u64,
}

impl Frame {
    /// Build a frame from an already decoded image.
    pub fn from_image(image: RgbaImage, timestamp_us: u64) -> Self {
        let (width, height) = image.dimensions();
        Self {
            data: image.into_raw(),
            width,
            height,
            timestamp_us,
        }
    }

    /// Copy the pixels into an `RgbaImage`, checking the buffer length.
    pub fn to_image(&self) -> Result<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.data.clone()).ok_or_else(|| {
            PipelineError::InvalidFrame(format!(
                "{} bytes for {}x{} RGBA",
                self.data.len(),
                self.width,
                self.height
            ))
        })
    }
}

/// Synchronous snapshot accessor over an already-initialised camera.
///
/// Device lifecycle stays with the implementor; the pipeline only asks
/// whether a frame can be read and reads the latest one.
pub trait FrameSource: Send + Sync {
    /// Whether the source has produced at least one usable frame.
    fn is_ready(&self) -> bool;

    /// The most recent frame, if any.
    fn frame(&self) -> Option<Arc<Frame>>;

    /// The latest frame, or `NoFrame` when the source is not ready.
    fn snapshot(&self) -> Result<Arc<Frame>> {
        if !self.is_ready() {
            return Err(PipelineError::NoFrame);
        }
        self.frame().ok_or(PipelineError::NoFrame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NeverReady;

    impl FrameSource for NeverReady {
        fn is_ready(&self) -> bool {
            false
        }
        fn frame(&self) -> Option<Arc<Frame>> {
            None
        }
    }

    #[test]
    fn to_image_rejects_short_buffer() {
        let frame = Frame {
            data: vec![0; 10],
            width: 4,
            height: 4,
            timestamp_us: 0,
        };
        assert!(matches!(
            frame.to_image(),
            Err(PipelineError::InvalidFrame(_))
        ));
    }

    #[test]
    fn from_image_keeps_dimensions() {
        let frame = Frame::from_image(RgbaImage::new(8, 6), 42);
        assert_eq!((frame.width, frame.height), (8, 6));
        assert_eq!(frame.data.len(), 8 * 6 * 4);
        assert_eq!(frame.to_image().unwrap().dimensions(), (8, 6));
    }

    #[test]
    fn snapshot_of_unready_source_is_no_frame() {
        assert!(matches!(NeverReady.snapshot(), Err(PipelineError::NoFrame)));
    }

    #[test]
    fn trait_object_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Box<dyn FrameSource>>();
    }
}
