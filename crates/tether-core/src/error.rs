use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The bounded allocation probe ran out of candidates: every id in the
    /// window is still live. Signals resource exhaustion, never retried.
    #[error("too many live handles")]
    TooManyLiveHandles,
}

pub type CoreResult<T> = Result<T, CoreError>;
