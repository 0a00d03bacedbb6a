use bytes::Bytes;
use tether_core::{PlayerId, RequestId, ResourceId};
use tether_host::SinkReadiness;

/// Why a playback tick was reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickReason {
    /// First report after observation started.
    Init,
    /// A seek began on the presentation surface.
    Seeking,
    /// A seek settled.
    Seeked,
    /// Periodic report.
    RegularInterval,
}

/// Notification from the core to the playback engine.
#[derive(Clone, Debug)]
pub enum CoreEvent {
    /// A fetch finished; the payload travels with the event.
    ByteRequestFinished {
        request: RequestId,
        bytes: Bytes,
        final_url: String,
    },
    /// A fetch finished; the payload stays retained in the resource store.
    ByteRequestFinishedNoCopy {
        request: RequestId,
        resource: ResourceId,
        final_url: String,
    },
    /// A fetch failed for a reason other than an abort.
    ByteRequestFailed { request: RequestId, message: String },
    /// The sink's readiness state machine moved.
    SinkReadinessChanged {
        player: PlayerId,
        readiness: SinkReadiness,
    },
    /// A queued operation on a track buffer finished.
    BufferUpdateFinished { player: PlayerId, buffer: u64 },
    /// Presentation-time progress report.
    PlaybackTick {
        player: PlayerId,
        reason: TickReason,
        position: f64,
    },
}
