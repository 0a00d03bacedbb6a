#![forbid(unsafe_code)]

//! Outbound notification surface toward the playback engine.
//!
//! Everything the core reports back — request completions, sink readiness,
//! buffer updates, playback ticks — travels as one [`CoreEvent`] over a
//! broadcast [`EventBus`]. Delivery is fire-and-forget: a disposed player's
//! late events are simply dropped by subscribers that no longer care.

mod bus;
mod event;

pub use bus::EventBus;
pub use event::{CoreEvent, TickReason};
