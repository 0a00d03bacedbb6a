//! Playback observation: periodic and event-driven progress reports.

use std::sync::Arc;

use tether_core::{ObserverState, PlayerId};
use tether_events::{CoreEvent, TickReason};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::Context;

/// Begin observing a player's presentation position. No-op when already
/// observing or the player is dead.
///
/// Seek begin/end on the surface each force an immediate tick; the first
/// tick (reason `Init`) fires on the next scheduler turn, then regular
/// ticks follow at the configured interval. A forced tick resets the
/// interval, so at most one timer is ever pending.
pub(crate) fn start(ctx: &Arc<Context>, player: PlayerId) {
    match ctx.players.with_player(player, |p| p.observer.is_some()) {
        None => {
            debug!(%player, "start observing: player not found");
            return;
        }
        Some(true) => {
            trace!(%player, "already observing");
            return;
        }
        Some(false) => {}
    }

    let Some(surface) = ctx.players.with_player(player, |p| p.surface.clone()) else {
        return;
    };

    let (tick_tx, mut tick_rx) = mpsc::unbounded_channel();
    let cancel = ctx.cancel.child_token();

    let mut seek_registrations = Vec::with_capacity(2);
    let tx = tick_tx.clone();
    match surface.on_seek_begin(Box::new(move || {
        let _ = tx.send(TickReason::Seeking);
    })) {
        Ok(registration) => seek_registrations.push(registration),
        Err(error) => warn!(%player, error = %error, "failed to register seek-begin listener"),
    }
    let tx = tick_tx.clone();
    match surface.on_seek_end(Box::new(move || {
        let _ = tx.send(TickReason::Seeked);
    })) {
        Ok(registration) => seek_registrations.push(registration),
        Err(error) => warn!(%player, error = %error, "failed to register seek-end listener"),
    }

    let stored = ctx.players.with_player_mut(player, |p| {
        if p.observer.is_some() {
            return false;
        }
        p.observer = Some(ObserverState {
            cancel: cancel.clone(),
            seek_registrations,
        });
        true
    });
    if stored != Some(true) {
        cancel.cancel();
        return;
    }

    let ctx = Arc::clone(ctx);
    let interval = ctx.options.tick_interval;
    tokio::spawn(async move {
        // Keeps the forced-tick channel open even when no seek listener
        // could be registered.
        let _tick_tx = tick_tx;
        let mut reason = TickReason::Init;
        loop {
            if cancel.is_cancelled() {
                return;
            }
            // A player disposed between scheduling and firing skips the
            // tick entirely.
            let Some(position) = ctx
                .players
                .with_player(player, |p| p.surface.current_position())
            else {
                trace!(%player, "observed player gone, stopping ticks");
                return;
            };
            ctx.events.publish(CoreEvent::PlaybackTick {
                player,
                reason,
                position,
            });

            tokio::select! {
                () = cancel.cancelled() => return,
                forced = tick_rx.recv() => match forced {
                    Some(forced_reason) => reason = forced_reason,
                    None => return,
                },
                () = tokio::time::sleep(interval) => reason = TickReason::RegularInterval,
            }
        }
    });
    debug!(%player, "playback observation started");
}

/// Stop observing. No-op when not observing.
pub(crate) fn stop(ctx: &Context, player: PlayerId) {
    let Some(state) = ctx
        .players
        .with_player_mut(player, |p| p.observer.take())
        .flatten()
    else {
        trace!(%player, "stop observing: nothing to stop");
        return;
    };
    release(state);
    debug!(%player, "playback observation stopped");
}

/// Cancel the pending timer and release the seek listeners.
pub(crate) fn release(state: ObserverState) {
    state.cancel.cancel();
    for registration in state.seek_registrations {
        registration.release();
    }
}
