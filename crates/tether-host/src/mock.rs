//! In-memory host double for tests.
//!
//! Records every call made through the host traits and lets tests drive the
//! callback side (readiness changes, update-finished, seeks) by hand.

use std::sync::{
    Arc, Weak,
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
};

use parking_lot::Mutex;

use crate::{
    CreateBufferError, HostError, HostResult, MediaHost, MediaSink, PresentationSurface,
    PresentationToken, ReadinessCallback, Registration, SeekCallback, SinkReadiness, TrackBuffer,
    UpdateCallback,
};

type ListenerSet<T> = Arc<Mutex<Vec<(u64, T)>>>;

fn register<T: Send + 'static>(set: &ListenerSet<T>, next: &AtomicU64, callback: T) -> Registration {
    let id = next.fetch_add(1, Ordering::Relaxed);
    set.lock().push((id, callback));
    let weak: Weak<Mutex<Vec<(u64, T)>>> = Arc::downgrade(set);
    Registration::new(move || {
        if let Some(set) = weak.upgrade() {
            set.lock().retain(|(entry, _)| *entry != id);
        }
    })
}

/// Test stand-in for the platform media facilities.
#[derive(Default)]
pub struct MockHost {
    sinks: Mutex<Vec<Arc<MockSink>>>,
    next_sink: AtomicU64,
    fail_sink_creation: Mutex<Option<String>>,
}

impl MockHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make the next `create_media_sink` call fail with the given message.
    pub fn fail_next_sink(&self, message: impl Into<String>) {
        *self.fail_sink_creation.lock() = Some(message.into());
    }

    /// Sink created by the `index`-th successful `create_media_sink` call.
    pub fn sink(&self, index: usize) -> Arc<MockSink> {
        Arc::clone(&self.sinks.lock()[index])
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.lock().len()
    }
}

impl MediaHost for MockHost {
    fn create_media_sink(&self) -> HostResult<Arc<dyn MediaSink>> {
        if let Some(message) = self.fail_sink_creation.lock().take() {
            return Err(HostError::new(message));
        }
        let sink = Arc::new(MockSink::new(self.next_sink.fetch_add(1, Ordering::Relaxed)));
        self.sinks.lock().push(Arc::clone(&sink));
        Ok(sink)
    }
}

/// Recorded sink state; starts `Open` so appends work out of the box.
pub struct MockSink {
    label: u64,
    readiness: Mutex<SinkReadiness>,
    readiness_listeners: ListenerSet<ReadinessCallback>,
    next_listener: AtomicU64,
    buffers: Mutex<Vec<Arc<MockBuffer>>>,
    removed_buffers: Mutex<Vec<Arc<MockBuffer>>>,
    duration: Mutex<Option<f64>>,
    token_released: AtomicBool,
    create_buffer_failure: Mutex<Option<CreateBufferError>>,
    create_buffer_calls: AtomicUsize,
}

impl MockSink {
    fn new(label: u64) -> Self {
        Self {
            label,
            readiness: Mutex::new(SinkReadiness::Open),
            readiness_listeners: Arc::new(Mutex::new(Vec::new())),
            next_listener: AtomicU64::new(0),
            buffers: Mutex::new(Vec::new()),
            removed_buffers: Mutex::new(Vec::new()),
            duration: Mutex::new(None),
            token_released: AtomicBool::new(false),
            create_buffer_failure: Mutex::new(None),
            create_buffer_calls: AtomicUsize::new(0),
        }
    }

    /// Transition the readiness state machine and fire listeners.
    pub fn set_readiness(&self, readiness: SinkReadiness) {
        *self.readiness.lock() = readiness;
        for (_, callback) in self.readiness_listeners.lock().iter() {
            callback(readiness);
        }
    }

    /// Make the next `create_buffer` call fail.
    pub fn fail_next_buffer(&self, error: CreateBufferError) {
        *self.create_buffer_failure.lock() = Some(error);
    }

    pub fn buffer(&self, index: usize) -> Arc<MockBuffer> {
        Arc::clone(&self.buffers.lock()[index])
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.lock().len()
    }

    /// Buffers passed to `remove_buffer`, in removal order.
    pub fn removed_buffers(&self) -> Vec<Arc<MockBuffer>> {
        self.removed_buffers.lock().clone()
    }

    pub fn create_buffer_calls(&self) -> usize {
        self.create_buffer_calls.load(Ordering::SeqCst)
    }

    pub fn duration(&self) -> Option<f64> {
        *self.duration.lock()
    }

    pub fn token_released(&self) -> bool {
        self.token_released.load(Ordering::SeqCst)
    }

    pub fn readiness_listener_count(&self) -> usize {
        self.readiness_listeners.lock().len()
    }
}

impl MediaSink for MockSink {
    fn readiness(&self) -> SinkReadiness {
        *self.readiness.lock()
    }

    fn on_readiness_change(&self, callback: ReadinessCallback) -> HostResult<Registration> {
        Ok(register(
            &self.readiness_listeners,
            &self.next_listener,
            callback,
        ))
    }

    fn presentation_token(&self) -> HostResult<PresentationToken> {
        Ok(PresentationToken::new(format!("mock://sink/{}", self.label)))
    }

    fn release_token(&self, _token: &PresentationToken) {
        self.token_released.store(true, Ordering::SeqCst);
    }

    fn set_duration(&self, seconds: f64) -> HostResult<()> {
        *self.duration.lock() = Some(seconds);
        Ok(())
    }

    fn create_buffer(&self, mime_type: &str) -> Result<Arc<dyn TrackBuffer>, CreateBufferError> {
        self.create_buffer_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.create_buffer_failure.lock().take() {
            return Err(error);
        }
        let buffer = Arc::new(MockBuffer::new(mime_type));
        self.buffers.lock().push(Arc::clone(&buffer));
        Ok(buffer)
    }

    fn remove_buffer(&self, buffer: &Arc<dyn TrackBuffer>) -> HostResult<()> {
        let mut buffers = self.buffers.lock();
        let target = Arc::as_ptr(buffer) as *const ();
        let Some(position) = buffers
            .iter()
            .position(|b| std::ptr::eq(Arc::as_ptr(b) as *const (), target))
        else {
            return Err(HostError::new("unknown track buffer"));
        };
        let removed = buffers.remove(position);
        self.removed_buffers.lock().push(removed);
        Ok(())
    }
}

/// Recorded per-track buffer.
pub struct MockBuffer {
    mime_type: String,
    appended: Mutex<Vec<Vec<u8>>>,
    removed_ranges: Mutex<Vec<(f64, f64)>>,
    aborted: AtomicBool,
    update_listeners: ListenerSet<UpdateCallback>,
    next_listener: AtomicU64,
    append_failure: Mutex<Option<String>>,
}

impl MockBuffer {
    fn new(mime_type: &str) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            appended: Mutex::new(Vec::new()),
            removed_ranges: Mutex::new(Vec::new()),
            aborted: AtomicBool::new(false),
            update_listeners: Arc::new(Mutex::new(Vec::new())),
            next_listener: AtomicU64::new(0),
            append_failure: Mutex::new(None),
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Make the next `append` call fail.
    pub fn fail_next_append(&self, message: impl Into<String>) {
        *self.append_failure.lock() = Some(message.into());
    }

    /// Fire the update-finished listeners, as the platform would after a
    /// queued append or remove completes.
    pub fn fire_update_finished(&self) {
        for (_, callback) in self.update_listeners.lock().iter() {
            callback();
        }
    }

    pub fn appended(&self) -> Vec<Vec<u8>> {
        self.appended.lock().clone()
    }

    pub fn removed_ranges(&self) -> Vec<(f64, f64)> {
        self.removed_ranges.lock().clone()
    }

    pub fn aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

impl TrackBuffer for MockBuffer {
    fn append(&self, bytes: &[u8]) -> HostResult<()> {
        if let Some(message) = self.append_failure.lock().take() {
            return Err(HostError::new(message));
        }
        self.appended.lock().push(bytes.to_vec());
        Ok(())
    }

    fn remove(&self, start: f64, end: f64) -> HostResult<()> {
        self.removed_ranges.lock().push((start, end));
        Ok(())
    }

    fn abort(&self) -> HostResult<()> {
        self.aborted.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn on_update_finished(&self, callback: UpdateCallback) -> HostResult<Registration> {
        Ok(register(
            &self.update_listeners,
            &self.next_listener,
            callback,
        ))
    }
}

/// Recorded presentation surface with a hand-driven position and seek events.
#[derive(Default)]
pub struct MockSurface {
    position: Mutex<f64>,
    bound: Mutex<Option<PresentationToken>>,
    seek_begin_listeners: ListenerSet<SeekCallback>,
    seek_end_listeners: ListenerSet<SeekCallback>,
    next_listener: AtomicU64,
}

impl MockSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_position(&self, seconds: f64) {
        *self.position.lock() = seconds;
    }

    pub fn bound_token(&self) -> Option<PresentationToken> {
        self.bound.lock().clone()
    }

    /// Fire the seek-begin listeners.
    pub fn begin_seek(&self, target: f64) {
        self.set_position(target);
        for (_, callback) in self.seek_begin_listeners.lock().iter() {
            callback();
        }
    }

    /// Fire the seek-end listeners.
    pub fn end_seek(&self) {
        for (_, callback) in self.seek_end_listeners.lock().iter() {
            callback();
        }
    }

    pub fn seek_listener_count(&self) -> usize {
        self.seek_begin_listeners.lock().len() + self.seek_end_listeners.lock().len()
    }
}

impl PresentationSurface for MockSurface {
    fn bind_media_sink(&self, token: &PresentationToken) -> HostResult<()> {
        *self.bound.lock() = Some(token.clone());
        Ok(())
    }

    fn clear_media_sink(&self) -> HostResult<()> {
        *self.bound.lock() = None;
        Ok(())
    }

    fn current_position(&self) -> f64 {
        *self.position.lock()
    }

    fn on_seek_begin(&self, callback: SeekCallback) -> HostResult<Registration> {
        Ok(register(
            &self.seek_begin_listeners,
            &self.next_listener,
            callback,
        ))
    }

    fn on_seek_end(&self, callback: SeekCallback) -> HostResult<Registration> {
        Ok(register(
            &self.seek_end_listeners,
            &self.next_listener,
            callback,
        ))
    }
}
