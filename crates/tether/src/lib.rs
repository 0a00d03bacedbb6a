#![forbid(unsafe_code)]

//! Binding and resource-arbitration layer between an opaque
//! streaming-playback engine and two host facilities it does not control: a
//! network-fetch facility and a platform media-buffering sink.
//!
//! The engine addresses everything through integer handles
//! ([`PlayerId`], [`RequestId`], [`ResourceId`]); this crate resolves those
//! handles to live host objects, keeps ownership and lifecycle invariants
//! across cancellable async operations, introspects fragmented-media
//! containers for timing metadata, and decides per track whether bytes must
//! be remuxed — and under which output codec string — before reaching the
//! sink.
//!
//! Inbound calls live on [`Dispatcher`]; everything the core reports back
//! travels as [`CoreEvent`]s on a broadcast bus. All state hangs off one
//! explicit [`Context`], torn down with [`Context::shutdown`].

pub mod codec;

mod buffer;
mod context;
mod dispatcher;
mod error;
mod net;
mod observer;
mod options;
mod requester;
mod session;
mod sink;

pub use codec::TrackKind;
pub use context::Context;
pub use dispatcher::{Dispatcher, LogLevel};
pub use error::{
    AddBufferError, AppendError, AttachError, RemoveRangeError, RequestError, SinkError,
};
pub use net::{FetchedBytes, NetClient, NetError, NetResult};
pub use options::Options;

pub use tether_core::{CoreError, CoreResult, PlayerId, RequestId, ResourceId};
pub use tether_events::{CoreEvent, EventBus, TickReason};
pub use tether_host::{
    CreateBufferError, HostError, HostResult, MediaHost, MediaSink, PresentationSurface,
    PresentationToken, Registration, Remuxer, SinkReadiness, TrackBuffer,
};
pub use tether_mp4 as mp4;
