//! Media sink attach/detach and sink-level operations.

use tether_core::{MediaSinkState, PlayerId};
use tether_events::CoreEvent;
use tether_host::{PresentationSurface, SinkReadiness};
use tracing::{debug, warn};

use crate::{
    Context,
    error::{AttachError, SinkError},
};

/// Create a sink on the host, wire readiness notifications to the engine,
/// and bind the sink to the player's presentation surface.
pub(crate) fn attach(ctx: &Context, player: PlayerId) -> Result<(), AttachError> {
    ctx.players
        .with_player_mut(player, |p| {
            if p.sink.is_some() {
                return Err(AttachError::AlreadyAttached);
            }

            let handle = ctx
                .host
                .create_media_sink()
                .map_err(|e| AttachError::Unknown(e.to_string()))?;

            let bus = ctx.events.clone();
            let readiness_registration = handle
                .on_readiness_change(Box::new(move |readiness| {
                    bus.publish(CoreEvent::SinkReadinessChanged { player, readiness });
                }))
                .map_err(|e| AttachError::Unknown(e.to_string()))?;

            let token = handle
                .presentation_token()
                .map_err(|e| AttachError::Unknown(e.to_string()))?;

            if let Err(error) = p.surface.bind_media_sink(&token) {
                handle.release_token(&token);
                return Err(AttachError::Unknown(error.to_string()));
            }

            debug!(%player, token = token.as_str(), "media sink attached");
            p.sink = Some(MediaSinkState {
                handle,
                token,
                buffers: Vec::new(),
                next_buffer_id: 0,
                readiness_registration,
            });
            Ok(())
        })
        .unwrap_or(Err(AttachError::PlayerInstanceNotFound))
}

/// Detach the player's sink, tearing down child buffers first.
pub(crate) fn detach(ctx: &Context, player: PlayerId) -> Result<(), SinkError> {
    let Some((state, surface)) = ctx
        .players
        .with_player_mut(player, |p| (p.sink.take(), p.surface.clone()))
    else {
        return Err(SinkError::PlayerInstanceNotFound);
    };
    let Some(state) = state else {
        return Err(SinkError::NoSinkAttached);
    };
    teardown_sink(state, surface.as_ref())
}

/// Shared sink teardown: release the readiness listener, abort and remove
/// child buffers in reverse registration order (unless the sink already
/// reached a terminal closed state), clear the surface binding, release the
/// presentation token.
///
/// Per-buffer failures are logged and never abort the loop.
pub(crate) fn teardown_sink(
    mut state: MediaSinkState,
    surface: &dyn PresentationSurface,
) -> Result<(), SinkError> {
    state.readiness_registration.release();

    if state.handle.readiness() != SinkReadiness::Closed {
        for buffer in state.buffers.drain(..).rev() {
            buffer.update_registration.release();
            if let Err(error) = buffer.handle.abort() {
                warn!(buffer = buffer.id, error = %error, "failed to abort track buffer during teardown");
            }
            if let Err(error) = state.handle.remove_buffer(&buffer.handle) {
                warn!(buffer = buffer.id, error = %error, "failed to remove track buffer during teardown");
            }
        }
    }

    let cleared = surface.clear_media_sink();
    state.handle.release_token(&state.token);
    debug!("media sink detached");
    cleared.map_err(|error| SinkError::Unknown(error.to_string()))
}

/// Set the presentation duration on the attached sink.
pub(crate) fn set_duration(ctx: &Context, player: PlayerId, seconds: f64) -> Result<(), SinkError> {
    ctx.players
        .with_player(player, |p| {
            let sink = p.sink.as_ref().ok_or(SinkError::NoSinkAttached)?;
            sink.handle
                .set_duration(seconds)
                .map_err(|e| SinkError::Unknown(e.to_string()))
        })
        .unwrap_or(Err(SinkError::PlayerInstanceNotFound))
}
