//! Inbound call surface exposed to the playback engine.

use std::sync::Arc;

use tether_core::{CoreResult, PlayerId, RequestId, ResourceId};
use tether_events::CoreEvent;
use tether_host::{MediaHost, PresentationSurface};
use tokio::sync::broadcast;
use url::Url;

use crate::{
    Context, TrackKind, buffer,
    error::{
        AddBufferError, AppendError, AttachError, RemoveRangeError, RequestError, SinkError,
    },
    observer,
    options::Options,
    requester::{self, FetchMode},
    session, sink,
};

/// Log levels accepted from the engine-facing `log` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

/// The engine's handle on the binding layer.
///
/// Every inbound call resolves its integer handles against the shared
/// [`Context`]; results go back as return values, asynchronous outcomes as
/// [`CoreEvent`]s on the broadcast surface.
///
/// Methods that spawn work (`fetch_bytes*`, `start_observing`) must be
/// called from within a tokio runtime.
#[derive(Clone)]
pub struct Dispatcher {
    ctx: Arc<Context>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(host: Arc<dyn MediaHost>, options: Options) -> Self {
        Self {
            ctx: Context::new(host, options),
        }
    }

    #[must_use]
    pub fn with_context(ctx: Arc<Context>) -> Self {
        Self { ctx }
    }

    #[must_use]
    pub fn context(&self) -> &Arc<Context> {
        &self.ctx
    }

    /// Subscribe to the outbound event surface.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.ctx.subscribe()
    }

    /// Register a new player session bound to a presentation surface.
    ///
    /// # Errors
    ///
    /// [`CoreError::TooManyLiveHandles`](tether_core::CoreError) when the
    /// session id space is exhausted.
    pub fn create_player(&self, surface: Arc<dyn PresentationSurface>) -> CoreResult<PlayerId> {
        session::create_player(&self.ctx, surface)
    }

    /// Dispose a player session and everything it owns. Idempotent; returns
    /// whether anything was disposed.
    pub fn dispose_player(&self, player: PlayerId) -> bool {
        session::dispose_player(&self.ctx, player)
    }

    /// Fetch a URL; the payload arrives with
    /// [`CoreEvent::ByteRequestFinished`].
    ///
    /// # Errors
    ///
    /// [`RequestError`] when the player is dead or the id space exhausted.
    pub fn fetch_bytes(&self, player: PlayerId, url: Url) -> Result<RequestId, RequestError> {
        requester::start_fetch(&self.ctx, player, url, FetchMode::Copy)
    }

    /// Fetch a URL; the payload is retained in the resource store and
    /// [`CoreEvent::ByteRequestFinishedNoCopy`] carries its id.
    ///
    /// # Errors
    ///
    /// [`RequestError`] when the player is dead or the id space exhausted.
    pub fn fetch_bytes_no_copy(
        &self,
        player: PlayerId,
        url: Url,
    ) -> Result<RequestId, RequestError> {
        requester::start_fetch(&self.ctx, player, url, FetchMode::Retain)
    }

    /// Abort an in-flight request. Returns whether it was still live.
    pub fn abort_request(&self, request: RequestId) -> bool {
        requester::abort(&self.ctx, request)
    }

    /// Attach a media sink to the player's presentation surface.
    ///
    /// # Errors
    ///
    /// [`AttachError`] when the player is dead, already has a sink, or the
    /// host refuses.
    pub fn attach_media_sink(&self, player: PlayerId) -> Result<(), AttachError> {
        sink::attach(&self.ctx, player)
    }

    /// Detach the player's sink, destroying child buffers first.
    ///
    /// # Errors
    ///
    /// [`SinkError`] when the player is dead, has no sink, or the host
    /// fails clearing the surface binding.
    pub fn detach_media_sink(&self, player: PlayerId) -> Result<(), SinkError> {
        sink::detach(&self.ctx, player)
    }

    /// Set the presentation duration in seconds.
    ///
    /// # Errors
    ///
    /// [`SinkError`] when the player is dead, has no sink, or the host call
    /// fails.
    pub fn set_sink_duration(&self, player: PlayerId, seconds: f64) -> Result<(), SinkError> {
        sink::set_duration(&self.ctx, player, seconds)
    }

    /// Create a track buffer; returns its sink-local id.
    ///
    /// # Errors
    ///
    /// [`AddBufferError`] — see its variants for the full failure surface.
    pub fn add_track_buffer(
        &self,
        player: PlayerId,
        kind: TrackKind,
        mime_type: &str,
    ) -> Result<u64, AddBufferError> {
        buffer::add_buffer(&self.ctx, player, kind, mime_type)
    }

    /// Append a byte range to a track buffer, remuxing first when the
    /// buffer was negotiated with a transform.
    ///
    /// # Errors
    ///
    /// [`AppendError`] on dead handles, a failed transform, or host faults.
    pub fn append_bytes(
        &self,
        player: PlayerId,
        buffer: u64,
        bytes: &[u8],
    ) -> Result<(), AppendError> {
        buffer::append(&self.ctx, player, buffer, bytes)
    }

    /// Append a retained resource's bytes to a track buffer.
    ///
    /// # Errors
    ///
    /// [`AppendError::GivenResourceNotFound`] when the resource id is dead,
    /// otherwise as [`append_bytes`](Dispatcher::append_bytes).
    pub fn append_resource(
        &self,
        player: PlayerId,
        buffer: u64,
        resource: ResourceId,
    ) -> Result<(), AppendError> {
        buffer::append_from_resource(&self.ctx, player, buffer, resource)
    }

    /// Trim buffered media in `[start, end)` seconds.
    ///
    /// # Errors
    ///
    /// [`RemoveRangeError`] on dead handles or host faults.
    pub fn remove_range(
        &self,
        player: PlayerId,
        buffer: u64,
        start: f64,
        end: f64,
    ) -> Result<(), RemoveRangeError> {
        buffer::remove_range(&self.ctx, player, buffer, start, end)
    }

    /// Begin reporting presentation-time progress. No-op when already
    /// observing.
    pub fn start_observing(&self, player: PlayerId) {
        observer::start(&self.ctx, player);
    }

    /// Stop reporting presentation-time progress. No-op when not observing.
    pub fn stop_observing(&self, player: PlayerId) {
        observer::stop(&self.ctx, player);
    }

    /// Free a retained resource. Returns whether it was still live.
    pub fn free_resource(&self, resource: ResourceId) -> bool {
        self.ctx.resources.delete(resource).is_some()
    }

    /// Engine-side log line, forwarded to the tracing subscriber.
    pub fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Error => tracing::error!(target: "engine", "{message}"),
            LogLevel::Warn => tracing::warn!(target: "engine", "{message}"),
            LogLevel::Info => tracing::info!(target: "engine", "{message}"),
            LogLevel::Debug => tracing::debug!(target: "engine", "{message}"),
        }
    }
}
