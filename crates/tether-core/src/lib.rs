#![forbid(unsafe_code)]

//! Opaque handles, bounded id allocation, and owned key-value stores.
//!
//! The playback engine addresses every live object — player sessions,
//! in-flight requests, retained byte resources — through integer handles.
//! This crate owns the handle lifecycle: collision-free allocation, flat
//! stores keyed by handle with ownership recorded on the value, and the
//! owner-scan disposal that guarantees no entry outlives its player.

mod error;
mod ids;
mod registry;
mod store;

pub use error::{CoreError, CoreResult};
pub use ids::{ID_MODULUS, IdAllocator, PlayerId, RequestId, ResourceId};
pub use registry::{
    MediaSinkState, ObserverState, PlayerInstance, PlayerRegistry, SourceBufferState,
};
pub use store::{RequestEntry, RequestStore, ResourceEntry, ResourceStore};
