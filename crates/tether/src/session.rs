//! Player session lifecycle.

use std::sync::Arc;

use tether_core::{CoreResult, PlayerId};
use tether_host::PresentationSurface;
use tracing::{debug, info, warn};

use crate::{Context, observer, sink};

/// Register a new player session bound to a presentation surface.
pub(crate) fn create_player(
    ctx: &Context,
    surface: Arc<dyn PresentationSurface>,
) -> CoreResult<PlayerId> {
    let player = ctx.players.create(surface)?;
    info!(%player, "player session created");
    Ok(player)
}

/// Dispose a player session: stop observation, tear the sink down, cancel
/// owned requests, free owned resources, remove the registry entry.
///
/// Idempotent — disposing a dead or already-disposing player is a no-op.
/// Returns whether anything was disposed.
pub(crate) fn dispose_player(ctx: &Context, player: PlayerId) -> bool {
    // Mark first so host callbacks fired during teardown observe a dead
    // player and cannot re-enter disposal.
    let Some((observer_state, sink_state, surface)) = ctx.players.with_player_mut(player, |p| {
        p.disposed = true;
        (p.observer.take(), p.sink.take(), p.surface.clone())
    }) else {
        debug!(%player, "dispose: player not found or already disposed");
        return false;
    };

    if let Some(state) = observer_state {
        observer::release(state);
    }
    if let Some(state) = sink_state {
        if let Err(error) = sink::teardown_sink(state, surface.as_ref()) {
            warn!(%player, error = %error, "sink teardown failed during disposal");
        }
    }

    let requests = ctx.requests.free_for_owner(player);
    let resources = ctx.resources.free_for_owner(player);
    ctx.players.remove(player);
    info!(%player, requests, resources, "player session disposed");
    true
}
