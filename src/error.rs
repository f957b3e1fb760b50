use thiserror::Error;

/// Errors raised by the augmentation and capture pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("image decode failed: {0}")]
    Decode(#[source] image::ImageError),

    #[error("image encode failed: {0}")]
    Encode(#[source] image::ImageError),

    #[error("no frame available from the source")]
    NoFrame,

    #[error("invalid frame buffer: {0}")]
    InvalidFrame(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("pipeline busy: {0}")]
    Busy(&'static str),

    #[error("configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Whether this error reports a busy pipeline rather than a failure.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy(_))
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_stage() {
        assert_eq!(
            PipelineError::NoFrame.to_string(),
            "no frame available from the source"
        );
        assert_eq!(
            PipelineError::Validation("count 0 outside [1, 50]".to_string()).to_string(),
            "validation failed: count 0 outside [1, 50]"
        );
    }

    #[test]
    fn busy_is_distinguishable() {
        assert!(PipelineError::Busy("burst running").is_busy());
        assert!(!PipelineError::NoFrame.is_busy());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PipelineError>();
    }
}
