//! Small types shared by the engine, the backends and the audio thread.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;

/// Identity of one audio resource. Never reused within a process.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId(u64);

impl ResourceId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEventKind {
    /// Emitted on a steady cadence while playing.
    Progress {
        current_ms: u64,
        duration_ms: Option<u64>,
    },
    /// Playback reached the end of the stream. Emitted once per resource.
    Ended,
    /// Decode or network failure of the resource.
    Error(String),
}

/// A notification raised by one specific resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEvent {
    pub resource: ResourceId,
    pub kind: EngineEventKind,
}

pub type Listener = Arc<dyn Fn(EngineEvent) + Send + Sync>;

/// Handle kept next to a resource; detaching silences its emitter.
///
/// Detach is synchronous: once `detach()` returns, no further event from that
/// resource reaches the listener. Dropping the handle detaches too.
#[derive(Debug)]
pub struct Subscription {
    resource: ResourceId,
    attached: Arc<AtomicBool>,
}

impl Subscription {
    pub fn resource(&self) -> ResourceId {
        self.resource
    }

    pub fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

/// The sending half handed to a backend when a resource is opened.
#[derive(Clone)]
pub struct EventEmitter {
    resource: ResourceId,
    attached: Arc<AtomicBool>,
    listener: Listener,
}

impl EventEmitter {
    pub fn resource(&self) -> ResourceId {
        self.resource
    }

    /// Deliver `kind` unless the subscription was detached. Returns whether it was delivered.
    pub fn emit(&self, kind: EngineEventKind) -> bool {
        if !self.attached.load(Ordering::SeqCst) {
            return false;
        }
        (self.listener)(EngineEvent {
            resource: self.resource,
            kind,
        });
        true
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("resource", &self.resource)
            .field("attached", &self.attached.load(Ordering::SeqCst))
            .finish()
    }
}

/// Create the subscription/emitter pair for a new resource.
pub fn subscribe(resource: ResourceId, listener: Listener) -> (Subscription, EventEmitter) {
    let attached = Arc::new(AtomicBool::new(true));
    (
        Subscription {
            resource,
            attached: attached.clone(),
        },
        EventEmitter {
            resource,
            attached,
            listener,
        },
    )
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    #[error("no audio output device: {0}")]
    OutputUnavailable(String),
    #[error("audio thread is not running")]
    ThreadGone,
    #[error("no stream loaded")]
    NotLoaded,
    #[error("failed to decode stream: {0}")]
    Decode(String),
    #[error("failed to fetch stream: {0}")]
    Fetch(String),
}

/// One playable output bound to a stream URL.
///
/// Implementations deliver notifications only through the `EventEmitter`
/// they were opened with.
pub trait AudioResource: Send {
    fn play(&mut self) -> Result<(), AudioError>;
    fn pause(&mut self);
    fn seek(&mut self, position_ms: u64);
    fn set_volume(&mut self, volume: f32);
    fn position_ms(&self) -> u64;
    /// Duration reported by the stream itself, once known.
    fn duration_ms(&self) -> Option<u64>;
    /// Stop output and free the underlying resource. Called exactly once.
    fn release(&mut self);
}

pub trait AudioBackend: Send {
    /// Construct a paused resource bound to `stream_url`.
    fn open(
        &mut self,
        stream_url: &str,
        volume: f32,
        emitter: EventEmitter,
    ) -> Result<Box<dyn AudioResource>, AudioError>;
}

#[derive(Debug, Clone, Default)]
/// What the audio thread publishes about the resource it is playing.
pub struct PlaybackInfo {
    pub resource: Option<ResourceId>,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub playing: bool,
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;

#[derive(Debug)]
pub enum AudioCmd {
    /// Make `id` the thread's resource; bytes follow via `Data`.
    Open {
        id: ResourceId,
        volume: f32,
        emitter: EventEmitter,
    },
    /// Downloaded stream bytes for `id`.
    Data { id: ResourceId, bytes: Vec<u8> },
    /// The download for `id` failed.
    FetchFailed { id: ResourceId, reason: String },
    Play(ResourceId),
    Pause(ResourceId),
    Seek { id: ResourceId, position: Duration },
    SetVolume { id: ResourceId, volume: f32 },
    /// Stop and drop `id` if it is still the thread's resource.
    Release(ResourceId),
    /// Stop everything and end the thread.
    Quit,
}

pub fn clamp_volume(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}
