use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use super::CapturedImage;

/// Receives every finished capture. Ownership of the image moves to the sink.
pub trait CaptureSink: Send + Sync {
    fn deliver(&self, image: CapturedImage);
}

/// Callback invoked with each captured image.
pub type CaptureCallback = Arc<dyn Fn(CapturedImage) + Send + Sync>;

/// Sink that forwards to a closure.
pub struct CallbackSink {
    callback: CaptureCallback,
}

impl CallbackSink {
    pub fn new(callback: impl Fn(CapturedImage) + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }
}

impl CaptureSink for CallbackSink {
    fn deliver(&self, image: CapturedImage) {
        (self.callback)(image);
    }
}

/// Channel sink; a closed receiver drops the image with a warning.
impl CaptureSink for UnboundedSender<CapturedImage> {
    fn deliver(&self, image: CapturedImage) {
        if let Err(e) = self.send(image) {
            tracing::warn!("Capture receiver closed, dropping image: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::augment::codec::OutputFormat;
    use parking_lot::Mutex;

    fn make_image(class_name: &str) -> CapturedImage {
        CapturedImage {
            bytes: vec![1, 2, 3],
            format: OutputFormat::Png,
            class_name: class_name.to_string(),
            captured_at: chrono::Utc::now(),
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn callback_sink_invokes_closure() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let sink = CallbackSink::new(move |img| seen_clone.lock().push(img.class_name));
        sink.deliver(make_image("cat"));
        sink.deliver(make_image("dog"));
        assert_eq!(*seen.lock(), vec!["cat".to_string(), "dog".to_string()]);
    }

    #[test]
    fn channel_sink_forwards_images() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        tx.deliver(make_image("cat"));
        assert_eq!(rx.try_recv().unwrap().class_name, "cat");
    }

    #[test]
    fn closed_channel_does_not_panic() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<CapturedImage>();
        drop(rx);
        tx.deliver(make_image("cat"));
    }

    #[test]
    fn sinks_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CallbackSink>();
        assert_send_sync::<Arc<dyn CaptureSink>>();
    }
}
