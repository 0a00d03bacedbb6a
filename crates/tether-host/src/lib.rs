#![forbid(unsafe_code)]

//! Host-facility abstraction for the tether binding layer.
//!
//! The playback core does not talk to the platform directly. Everything it
//! needs from the host — creating media sinks, appending to track buffers,
//! binding a sink to a presentation surface — goes through the trait objects
//! defined here, resolved once at startup. Vendor-specific API variants live
//! behind a concrete [`MediaHost`] implementation; the core only ever sees
//! the normalized operation set.

mod error;
mod registration;
mod traits;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use error::{CreateBufferError, HostError, HostResult};
pub use registration::Registration;
pub use traits::{
    MediaHost, MediaSink, PresentationSurface, PresentationToken, ReadinessCallback, Remuxer,
    SeekCallback, SinkReadiness, TrackBuffer, UpdateCallback,
};
