use std::{sync::Arc, time::Duration};

use tether_host::Remuxer;

/// Configuration for the binding layer.
#[derive(Clone)]
pub struct Options {
    /// Delay between regular playback ticks.
    pub tick_interval: Duration,
    /// Timeout applied to each byte fetch.
    pub request_timeout: Duration,
    /// Capacity of the outbound event channel.
    pub events_channel_capacity: usize,
    /// Byte-level container transform for transport-stream input. Without
    /// one, transport-stream track buffers are rejected as unsupported.
    pub remuxer: Option<Arc<dyn Remuxer>>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            request_timeout: Duration::from_secs(30),
            events_channel_capacity: 32,
            remuxer: None,
        }
    }
}
