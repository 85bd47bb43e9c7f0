use thiserror::Error;

/// AR session errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("high-resolution capture unavailable: {0}")]
    CaptureUnavailable(String),

    #[error("session interrupted: {0}")]
    Interrupted(String),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, SessionError>;
