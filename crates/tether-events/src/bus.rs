use tokio::sync::broadcast;

use crate::CoreEvent;

/// Broadcast bus carrying [`CoreEvent`]s to the engine.
///
/// `publish()` is a sync call, safe from host callbacks and spawned tasks
/// alike. With no subscribers, events are silently dropped.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: CoreEvent) {
        let _ = self.tx.send(event);
    }

    /// Subscribe to all future events. Slow subscribers observe
    /// `RecvError::Lagged` instead of blocking publishers.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.tx.subscribe()
    }
}
