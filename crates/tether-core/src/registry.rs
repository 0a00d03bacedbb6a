//! Per-player state and the registry that owns it.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tether_host::{MediaSink, PresentationSurface, PresentationToken, Registration, Remuxer, TrackBuffer};
use tokio_util::sync::CancellationToken;

use crate::{
    error::CoreResult,
    ids::{IdAllocator, PlayerId},
};

/// One track buffer bound to a sink.
///
/// Local ids are unique and monotonically increasing for the lifetime of
/// the owning sink state; they are never reused, even after removal.
pub struct SourceBufferState {
    pub id: u64,
    pub handle: Arc<dyn TrackBuffer>,
    /// Transform applied to every appended chunk, when the negotiated type
    /// required remuxing.
    pub remux: Option<Arc<dyn Remuxer>>,
    /// Update-finished listener; released when the buffer is torn down.
    pub update_registration: Registration,
}

/// Live sink state for one player. Exists only after the sink was created
/// and attached; tearing it down destroys child buffers first, then the
/// sink resources.
pub struct MediaSinkState {
    pub handle: Arc<dyn MediaSink>,
    pub token: PresentationToken,
    /// Child buffers in registration order.
    pub buffers: Vec<SourceBufferState>,
    pub next_buffer_id: u64,
    /// Readiness-change listener; released on detach.
    pub readiness_registration: Registration,
}

/// Playback-observation state. The spawned observer task owns the timer;
/// cancelling the token is what guarantees no further tick fires.
pub struct ObserverState {
    pub cancel: CancellationToken,
    /// Seek listeners on the presentation surface.
    pub seek_registrations: Vec<Registration>,
}

/// One live player session.
pub struct PlayerInstance {
    pub surface: Arc<dyn PresentationSurface>,
    pub sink: Option<MediaSinkState>,
    pub observer: Option<ObserverState>,
    /// Set at the start of disposal; guards re-entrant disposal from host
    /// callbacks fired during teardown.
    pub disposed: bool,
}

impl PlayerInstance {
    fn new(surface: Arc<dyn PresentationSurface>) -> Self {
        Self {
            surface,
            sink: None,
            observer: None,
            disposed: false,
        }
    }
}

/// Registry of live player sessions, keyed by [`PlayerId`].
#[derive(Default)]
pub struct PlayerRegistry {
    players: DashMap<PlayerId, PlayerInstance>,
    alloc: Mutex<IdAllocator>,
}

impl PlayerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session bound to the given presentation surface.
    ///
    /// # Errors
    ///
    /// [`CoreError::TooManyLiveHandles`](crate::CoreError::TooManyLiveHandles)
    /// when the id space is exhausted.
    pub fn create(&self, surface: Arc<dyn PresentationSurface>) -> CoreResult<PlayerId> {
        let id = self
            .alloc
            .lock()
            .next(|candidate| self.players.contains_key(&PlayerId(candidate)))?;
        let id = PlayerId(id);
        self.players.insert(id, PlayerInstance::new(surface));
        Ok(id)
    }

    #[must_use]
    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    /// Run `f` against the live, non-disposed player. `None` when the id is
    /// dead — resumed continuations treat that as silent cancellation.
    pub fn with_player<R>(&self, id: PlayerId, f: impl FnOnce(&PlayerInstance) -> R) -> Option<R> {
        let entry = self.players.get(&id)?;
        if entry.disposed {
            return None;
        }
        Some(f(&entry))
    }

    /// Mutable variant of [`with_player`](PlayerRegistry::with_player).
    pub fn with_player_mut<R>(
        &self,
        id: PlayerId,
        f: impl FnOnce(&mut PlayerInstance) -> R,
    ) -> Option<R> {
        let mut entry = self.players.get_mut(&id)?;
        if entry.disposed {
            return None;
        }
        Some(f(&mut entry))
    }

    /// Remove the entry. Later lookups observe absence.
    pub fn remove(&self, id: PlayerId) -> Option<PlayerInstance> {
        self.players.remove(&id).map(|(_, player)| player)
    }

    /// Ids of every live session.
    #[must_use]
    pub fn ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|entry| *entry.key()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
