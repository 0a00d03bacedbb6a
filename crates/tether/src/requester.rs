//! Byte fetches on behalf of players, with cooperative cancellation.

use std::sync::Arc;

use tether_core::{PlayerId, RequestId};
use tether_events::CoreEvent;
use tracing::{debug, trace, warn};
use url::Url;

use crate::{Context, error::RequestError, net::FetchedBytes};

/// How a completed fetch is delivered to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FetchMode {
    /// Payload travels with the completion event.
    Copy,
    /// Payload is retained in the resource store; the event carries its id.
    Retain,
}

/// Start a fetch owned by `player`. The returned id stays live until the
/// request completes, is aborted, or its owner is disposed.
pub(crate) fn start_fetch(
    ctx: &Arc<Context>,
    player: PlayerId,
    url: Url,
    mode: FetchMode,
) -> Result<RequestId, RequestError> {
    if !ctx.players.contains(player) {
        return Err(RequestError::PlayerInstanceNotFound);
    }
    let cancel = ctx.cancel.child_token();
    let request = ctx
        .requests
        .create(player, cancel.clone())
        .map_err(|_| RequestError::TooManyLiveHandles)?;
    debug!(%request, %player, url = %url, "starting byte fetch");

    let ctx = Arc::clone(ctx);
    tokio::spawn(async move {
        let outcome = tokio::select! {
            () = cancel.cancelled() => {
                trace!(%request, "fetch aborted");
                return;
            }
            outcome = ctx.net.get_bytes(url) => outcome,
        };

        // The store entry disappears on abort or owner disposal; a dead id
        // means this completion must not touch anything.
        if ctx.requests.get(request).is_none() {
            trace!(%request, "request no longer live, dropping completion");
            return;
        }

        match outcome {
            Ok(fetched) => deliver(&ctx, player, request, fetched, mode),
            Err(error) => {
                warn!(%request, error = %error, "byte fetch failed");
                ctx.events.publish(CoreEvent::ByteRequestFailed {
                    request,
                    message: error.to_string(),
                });
            }
        }

        // Removed only after delivery, so a completion already scheduled on
        // this turn can never observe its id reused.
        ctx.requests.delete(request);
    });
    Ok(request)
}

fn deliver(
    ctx: &Context,
    player: PlayerId,
    request: RequestId,
    fetched: FetchedBytes,
    mode: FetchMode,
) {
    let final_url = fetched.final_url.to_string();
    match mode {
        FetchMode::Copy => ctx.events.publish(CoreEvent::ByteRequestFinished {
            request,
            bytes: fetched.bytes,
            final_url,
        }),
        FetchMode::Retain => match ctx.resources.create(player, fetched.bytes) {
            Ok(resource) => ctx.events.publish(CoreEvent::ByteRequestFinishedNoCopy {
                request,
                resource,
                final_url,
            }),
            Err(error) => {
                warn!(%request, error = %error, "failed to retain fetched bytes");
                ctx.events.publish(CoreEvent::ByteRequestFailed {
                    request,
                    message: error.to_string(),
                });
            }
        },
    }
}

/// Abort an in-flight request. Returns whether it was still live. Aborts
/// are silent: no completion or failure event follows.
pub(crate) fn abort(ctx: &Context, request: RequestId) -> bool {
    match ctx.requests.delete(request) {
        Some(entry) => {
            entry.cancel.cancel();
            debug!(%request, "request aborted");
            true
        }
        None => false,
    }
}
