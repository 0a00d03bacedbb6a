//! Process-wide state for the binding layer.

use std::sync::Arc;

use tether_core::{PlayerRegistry, RequestStore, ResourceStore};
use tether_events::{CoreEvent, EventBus};
use tether_host::MediaHost;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{net::NetClient, options::Options, session};

/// All state the binding layer owns, behind one explicit object.
///
/// Created once at process start with the resolved [`MediaHost`], torn down
/// with [`shutdown`](Context::shutdown). Every store operation goes through
/// this context; there is no ambient global state.
pub struct Context {
    pub(crate) host: Arc<dyn MediaHost>,
    pub(crate) players: PlayerRegistry,
    pub(crate) requests: RequestStore,
    pub(crate) resources: ResourceStore,
    pub(crate) events: EventBus,
    pub(crate) net: NetClient,
    pub(crate) options: Options,
    /// Root token; every request and observer holds a child of it.
    pub(crate) cancel: CancellationToken,
}

impl Context {
    pub fn new(host: Arc<dyn MediaHost>, options: Options) -> Arc<Self> {
        let events = EventBus::new(options.events_channel_capacity);
        let net = NetClient::new(options.request_timeout);
        Arc::new(Self {
            host,
            players: PlayerRegistry::new(),
            requests: RequestStore::new(),
            resources: ResourceStore::new(),
            events,
            net,
            options,
            cancel: CancellationToken::new(),
        })
    }

    /// Subscribe to the outbound event surface.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.events.subscribe()
    }

    /// Tear everything down: cancel outstanding work, dispose every live
    /// player, drain the stores.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        let players = self.players.ids();
        for player in &players {
            session::dispose_player(self, *player);
        }
        info!(players = players.len(), "context shut down");
    }
}
