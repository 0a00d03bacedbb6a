use thiserror::Error;

/// Failures attaching a media sink to a player.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttachError {
    #[error("player instance not found")]
    PlayerInstanceNotFound,

    #[error("a media sink is already attached")]
    AlreadyAttached,

    #[error("{0}")]
    Unknown(String),
}

/// Failures operating on an attached sink (detach, duration).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SinkError {
    #[error("player instance not found")]
    PlayerInstanceNotFound,

    #[error("no media sink attached")]
    NoSinkAttached,

    #[error("{0}")]
    Unknown(String),
}

/// Failures creating a track buffer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddBufferError {
    #[error("player instance not found")]
    PlayerInstanceNotFound,

    #[error("no media sink attached")]
    NoSinkAttached,

    #[error("media sink is closed")]
    SinkClosed,

    #[error("empty mime type")]
    EmptyMimeType,

    #[error("track buffer quota exceeded")]
    QuotaExceeded,

    #[error("media type not supported")]
    TypeNotSupported,

    #[error("{0}")]
    Unknown(String),
}

/// Failures appending to or resolving a track buffer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppendError {
    #[error("player or track buffer not found")]
    PlayerOrBufferNotFound,

    #[error("given resource not found")]
    GivenResourceNotFound,

    #[error("remux transform produced no output")]
    RemuxFailed,

    #[error("{0}")]
    Unknown(String),
}

/// Failures trimming a buffered range.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RemoveRangeError {
    #[error("player or track buffer not found")]
    PlayerOrBufferNotFound,

    #[error("{0}")]
    Unknown(String),
}

/// Failures starting a byte fetch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("player instance not found")]
    PlayerInstanceNotFound,

    #[error("too many live handles")]
    TooManyLiveHandles,
}
