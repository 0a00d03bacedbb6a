//! Track-buffer operations: creation, appends, range removal.

use tether_core::{PlayerId, ResourceId, SourceBufferState};
use tether_events::CoreEvent;
use tether_host::{CreateBufferError, SinkReadiness};
use tracing::{debug, trace, warn};

use crate::{
    Context, TrackKind, codec,
    error::{AddBufferError, AppendError, RemoveRangeError},
};

/// Create a track buffer for the given media type, negotiating the output
/// type (and remembering the remux obligation) when the input is a
/// transport-stream family type.
pub(crate) fn add_buffer(
    ctx: &Context,
    player: PlayerId,
    kind: TrackKind,
    mime_type: &str,
) -> Result<u64, AddBufferError> {
    // Rejected before any host call.
    if mime_type.is_empty() {
        return Err(AddBufferError::EmptyMimeType);
    }

    ctx.players
        .with_player_mut(player, |p| {
            let sink = p.sink.as_mut().ok_or(AddBufferError::NoSinkAttached)?;
            if sink.handle.readiness() == SinkReadiness::Closed {
                return Err(AddBufferError::SinkClosed);
            }

            let (negotiated, remux) = if codec::needs_remux(mime_type) {
                let Some(remuxer) = ctx.options.remuxer.clone() else {
                    debug!(mime_type, "no remux transform configured for transport-stream type");
                    return Err(AddBufferError::TypeNotSupported);
                };
                (codec::negotiate_output_type(mime_type, kind), Some(remuxer))
            } else {
                (mime_type.to_string(), None)
            };

            let handle = sink.handle.create_buffer(&negotiated).map_err(|e| match e {
                CreateBufferError::QuotaExceeded(_) => AddBufferError::QuotaExceeded,
                CreateBufferError::TypeNotSupported(_) => AddBufferError::TypeNotSupported,
                CreateBufferError::Other(message) => AddBufferError::Unknown(message),
            })?;

            let id = sink.next_buffer_id;
            sink.next_buffer_id += 1;

            let bus = ctx.events.clone();
            let update_registration = match handle.on_update_finished(Box::new(move || {
                bus.publish(CoreEvent::BufferUpdateFinished { player, buffer: id });
            })) {
                Ok(registration) => registration,
                Err(error) => {
                    if let Err(remove_error) = sink.handle.remove_buffer(&handle) {
                        warn!(buffer = id, error = %remove_error, "failed to remove half-created track buffer");
                    }
                    return Err(AddBufferError::Unknown(error.to_string()));
                }
            };

            debug!(%player, buffer = id, mime_type, negotiated = %negotiated, "track buffer added");
            sink.buffers.push(SourceBufferState {
                id,
                handle,
                remux,
                update_registration,
            });
            Ok(id)
        })
        .unwrap_or(Err(AddBufferError::PlayerInstanceNotFound))
}

/// Append a byte range, running the remux transform first when the buffer
/// was created with one. A transform that produces no output fails the
/// append without pushing anything to the sink.
pub(crate) fn append(
    ctx: &Context,
    player: PlayerId,
    buffer: u64,
    bytes: &[u8],
) -> Result<(), AppendError> {
    ctx.players
        .with_player(player, |p| {
            let sink = p.sink.as_ref().ok_or(AppendError::PlayerOrBufferNotFound)?;
            let state = sink
                .buffers
                .iter()
                .find(|b| b.id == buffer)
                .ok_or(AppendError::PlayerOrBufferNotFound)?;

            let result = match &state.remux {
                Some(remuxer) => {
                    let Some(output) = remuxer.remux(bytes) else {
                        warn!(%player, buffer, len = bytes.len(), "remux transform produced no output, dropping chunk");
                        return Err(AppendError::RemuxFailed);
                    };
                    trace_fragment_timing(player, buffer, &output);
                    state.handle.append(&output)
                }
                None => state.handle.append(bytes),
            };
            result.map_err(|error| AppendError::Unknown(error.to_string()))
        })
        .unwrap_or(Err(AppendError::PlayerOrBufferNotFound))
}

/// Recover timing metadata from a freshly remuxed fragment. Diagnostic
/// only; a fragment the introspector cannot read still gets appended.
fn trace_fragment_timing(player: PlayerId, buffer: u64, bytes: &[u8]) {
    match tether_mp4::fragment_duration(bytes) {
        Ok(duration) => {
            let decode_time = tether_mp4::fragment_decode_time(bytes);
            trace!(%player, buffer, ?decode_time, ?duration, "remuxed fragment timing");
        }
        Err(error) => {
            warn!(%player, buffer, error = %error, "remuxed fragment has degenerate box structure");
        }
    }
}

/// Append a retained resource's bytes.
pub(crate) fn append_from_resource(
    ctx: &Context,
    player: PlayerId,
    buffer: u64,
    resource: ResourceId,
) -> Result<(), AppendError> {
    let Some(entry) = ctx.resources.get(resource) else {
        return Err(AppendError::GivenResourceNotFound);
    };
    append(ctx, player, buffer, &entry.bytes)
}

/// Trim buffered media in `[start, end)` seconds.
pub(crate) fn remove_range(
    ctx: &Context,
    player: PlayerId,
    buffer: u64,
    start: f64,
    end: f64,
) -> Result<(), RemoveRangeError> {
    ctx.players
        .with_player(player, |p| {
            let sink = p
                .sink
                .as_ref()
                .ok_or(RemoveRangeError::PlayerOrBufferNotFound)?;
            let state = sink
                .buffers
                .iter()
                .find(|b| b.id == buffer)
                .ok_or(RemoveRangeError::PlayerOrBufferNotFound)?;
            state
                .handle
                .remove(start, end)
                .map_err(|error| RemoveRangeError::Unknown(error.to_string()))
        })
        .unwrap_or(Err(RemoveRangeError::PlayerOrBufferNotFound))
}
