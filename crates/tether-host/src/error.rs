use thiserror::Error;

/// Fault raised by a platform media facility.
///
/// The host message is preserved verbatim so boundary operations can carry
/// it back to the engine inside their own error kinds.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HostError(pub String);

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type HostResult<T> = Result<T, HostError>;

/// Faults specific to track-buffer creation on a sink.
#[derive(Debug, Error)]
pub enum CreateBufferError {
    #[error("track buffer quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("media type not supported: {0}")]
    TypeNotSupported(String),

    #[error("{0}")]
    Other(String),
}
