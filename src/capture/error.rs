use thiserror::Error;

/// Pixel-buffer decode errors.
///
/// Non-fatal by design: a color failure aborts the publish it belongs to, a
/// depth failure just drops the depth image for that capture.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("buffer has empty extent ({width}×{height})")]
    EmptyExtent { width: u32, height: u32 },

    #[error("{plane} plane holds {actual} samples, expected {expected}")]
    PlaneMismatch {
        plane: &'static str,
        actual: usize,
        expected: usize,
    },
}

/// Capture coordination errors surfaced to callers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("a capture request is already in flight")]
    RequestPending,

    #[error("capture worker failed to start: {0}")]
    Worker(String),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, CaptureError>;
