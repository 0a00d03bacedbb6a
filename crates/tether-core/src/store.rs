//! Flat stores for in-flight requests and retained byte resources.
//!
//! Ownership is a plain field on the value; disposal recovers a player's
//! entries by scanning for the owner id. Lookups after a delete or an
//! owner-wide free observe absence, which is what lets resumed continuations
//! treat a missing entry as a silent cancellation.

use bytes::Bytes;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::{
    error::CoreResult,
    ids::{IdAllocator, PlayerId, RequestId, ResourceId},
};

/// An in-flight network request owned by one player.
#[derive(Clone, Debug)]
pub struct RequestEntry {
    pub owner: PlayerId,
    pub cancel: CancellationToken,
}

/// Store of in-flight requests, keyed by [`RequestId`].
#[derive(Debug, Default)]
pub struct RequestStore {
    entries: DashMap<RequestId, RequestEntry>,
    alloc: Mutex<IdAllocator>,
}

impl RequestStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id and record the request under it.
    ///
    /// # Errors
    ///
    /// [`CoreError::TooManyLiveHandles`](crate::CoreError::TooManyLiveHandles)
    /// when the id space is exhausted.
    pub fn create(&self, owner: PlayerId, cancel: CancellationToken) -> CoreResult<RequestId> {
        let id = self
            .alloc
            .lock()
            .next(|candidate| self.entries.contains_key(&RequestId(candidate)))?;
        let id = RequestId(id);
        self.entries.insert(id, RequestEntry { owner, cancel });
        Ok(id)
    }

    #[must_use]
    pub fn get(&self, id: RequestId) -> Option<RequestEntry> {
        self.entries.get(&id).map(|entry| entry.clone())
    }

    /// Remove the entry, returning it if it was still live.
    pub fn delete(&self, id: RequestId) -> Option<RequestEntry> {
        self.entries.remove(&id).map(|(_, entry)| entry)
    }

    /// Cancel and remove every request owned by `owner`. Returns how many
    /// entries were freed. Used exclusively during player disposal.
    pub fn free_for_owner(&self, owner: PlayerId) -> usize {
        let owned: Vec<RequestId> = self
            .entries
            .iter()
            .filter(|entry| entry.owner == owner)
            .map(|entry| *entry.key())
            .collect();
        for id in &owned {
            if let Some((_, entry)) = self.entries.remove(id) {
                entry.cancel.cancel();
                trace!(request = %id, player = %owner, "cancelled owned request");
            }
        }
        owned.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A retained in-memory byte resource owned by one player.
#[derive(Clone, Debug)]
pub struct ResourceEntry {
    pub owner: PlayerId,
    pub bytes: Bytes,
}

/// Store of retained byte resources, keyed by [`ResourceId`].
#[derive(Debug, Default)]
pub struct ResourceStore {
    entries: DashMap<ResourceId, ResourceEntry>,
    alloc: Mutex<IdAllocator>,
}

impl ResourceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id and retain the bytes under it.
    ///
    /// # Errors
    ///
    /// [`CoreError::TooManyLiveHandles`](crate::CoreError::TooManyLiveHandles)
    /// when the id space is exhausted.
    pub fn create(&self, owner: PlayerId, bytes: Bytes) -> CoreResult<ResourceId> {
        let id = self
            .alloc
            .lock()
            .next(|candidate| self.entries.contains_key(&ResourceId(candidate)))?;
        let id = ResourceId(id);
        self.entries.insert(id, ResourceEntry { owner, bytes });
        Ok(id)
    }

    #[must_use]
    pub fn get(&self, id: ResourceId) -> Option<ResourceEntry> {
        self.entries.get(&id).map(|entry| entry.clone())
    }

    /// Remove the entry, returning it if it was still live.
    pub fn delete(&self, id: ResourceId) -> Option<ResourceEntry> {
        self.entries.remove(&id).map(|(_, entry)| entry)
    }

    /// Free every resource owned by `owner`. Returns how many entries were
    /// freed. Used exclusively during player disposal.
    pub fn free_for_owner(&self, owner: PlayerId) -> usize {
        let owned: Vec<ResourceId> = self
            .entries
            .iter()
            .filter(|entry| entry.owner == owner)
            .map(|entry| *entry.key())
            .collect();
        for id in &owned {
            self.entries.remove(id);
        }
        owned.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
