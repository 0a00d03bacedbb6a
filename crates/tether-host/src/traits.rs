use std::sync::Arc;

use bytes::Bytes;

use crate::{
    error::{CreateBufferError, HostResult},
    registration::Registration,
};

/// Readiness states of a platform media sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkReadiness {
    /// The sink is not attached to any presentation surface.
    Closed,
    /// The sink is attached and accepts track buffers and appends.
    Open,
    /// The end of the media was signalled; no further appends.
    Ended,
}

/// Opaque token binding a media sink to a presentation surface.
///
/// Obtained from the sink, handed to the surface, and released back to the
/// sink once the binding is cleared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PresentationToken(String);

impl PresentationToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub type ReadinessCallback = Box<dyn Fn(SinkReadiness) + Send + Sync>;
pub type UpdateCallback = Box<dyn Fn() + Send + Sync>;
pub type SeekCallback = Box<dyn Fn() + Send + Sync>;

/// Entry point to the platform media facilities.
///
/// Resolved once at context creation; the rest of the core only sees this
/// normalized operation set, never a vendor-specific API variant.
pub trait MediaHost: Send + Sync + 'static {
    /// Create a fresh media sink.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`](crate::HostError) when the platform refuses to
    /// create a sink.
    fn create_media_sink(&self) -> HostResult<Arc<dyn MediaSink>>;
}

/// A platform media sink: progressively buffers encoded media for
/// presentation and owns zero or more track buffers.
pub trait MediaSink: Send + Sync + 'static {
    /// Current readiness state.
    fn readiness(&self) -> SinkReadiness;

    /// Register a readiness-change listener.
    fn on_readiness_change(&self, callback: ReadinessCallback) -> HostResult<Registration>;

    /// Obtain the token that binds this sink to a presentation surface.
    fn presentation_token(&self) -> HostResult<PresentationToken>;

    /// Release a token previously obtained from [`presentation_token`].
    ///
    /// [`presentation_token`]: MediaSink::presentation_token
    fn release_token(&self, token: &PresentationToken);

    /// Set the presentation duration in seconds.
    fn set_duration(&self, seconds: f64) -> HostResult<()>;

    /// Create a track buffer accepting byte ranges of the given media type.
    fn create_buffer(&self, mime_type: &str) -> Result<Arc<dyn TrackBuffer>, CreateBufferError>;

    /// Remove a track buffer previously created on this sink.
    fn remove_buffer(&self, buffer: &Arc<dyn TrackBuffer>) -> HostResult<()>;
}

/// A per-track append target on a sink.
pub trait TrackBuffer: Send + Sync + 'static {
    /// Queue a byte range for buffering. Completion is reported through the
    /// update-finished listener, not through this call.
    fn append(&self, bytes: &[u8]) -> HostResult<()>;

    /// Trim buffered media in the `[start, end)` time range (seconds).
    fn remove(&self, start: f64, end: f64) -> HostResult<()>;

    /// Abort any in-flight append.
    fn abort(&self) -> HostResult<()>;

    /// Register a listener fired every time a queued operation finishes.
    fn on_update_finished(&self, callback: UpdateCallback) -> HostResult<Registration>;
}

/// The surface media is presented on; owns the playback position.
pub trait PresentationSurface: Send + Sync + 'static {
    /// Bind a media sink to this surface.
    fn bind_media_sink(&self, token: &PresentationToken) -> HostResult<()>;

    /// Clear any sink binding.
    fn clear_media_sink(&self) -> HostResult<()>;

    /// Current presentation position in seconds.
    fn current_position(&self) -> f64;

    /// Register a listener fired when a seek starts.
    fn on_seek_begin(&self, callback: SeekCallback) -> HostResult<Registration>;

    /// Register a listener fired when a seek settles.
    fn on_seek_end(&self, callback: SeekCallback) -> HostResult<Registration>;
}

/// Byte-level container transform, consumed as an opaque function.
///
/// Rewrites one container format's byte stream into another without
/// re-encoding the elementary streams. `None` signals the transform produced
/// no output for this input; the caller must not forward the original bytes
/// in that case.
pub trait Remuxer: Send + Sync + 'static {
    fn remux(&self, input: &[u8]) -> Option<Bytes>;
}
