//! In-process fakes for the lookup service, the credential gateway and the
//! audio backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::audio::{
    AudioBackend, AudioError, AudioResource, EngineEventKind, EventEmitter,
};
use crate::auth::AuthGateway;
use crate::resolver::{LookupError, LookupKey, StreamCandidate, StreamLookup};
use crate::track::TrackDescriptor;

pub fn track(id: &str) -> TrackDescriptor {
    TrackDescriptor::new(id, format!("Song {id}"))
        .with_artist(format!("artist-{id}"), format!("Artist {id}"))
        .with_duration_ms(200_000)
}

pub fn candidate(quality: &str, url: &str) -> StreamCandidate {
    StreamCandidate {
        quality_tag: quality.to_string(),
        url: url.to_string(),
    }
}

#[derive(Clone)]
pub enum Reply {
    Candidates(Vec<StreamCandidate>),
    Unauthorized,
    Status(u16),
    /// Never answers.
    Hang,
}

/// Scripted `StreamLookup`. Unknown ids answer with a single 160kbps stream
/// at `https://cdn.test/<id>.mp3`.
#[derive(Default)]
pub struct FakeLookup {
    replies: Mutex<HashMap<String, Reply>>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeLookup {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, id: &str, reply: Reply) {
        self.replies.lock().unwrap().insert(id.to_string(), reply);
    }

    /// Hold lookups for `id` until `release(id)` is called.
    pub fn gate(&self, id: &str) {
        self.gates
            .lock()
            .unwrap()
            .insert(id.to_string(), Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self, id: &str) {
        if let Some(g) = self.gates.lock().unwrap().get(id) {
            g.add_permits(64);
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, id: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == id).count()
    }
}

pub fn default_stream_url(id: &str) -> String {
    format!("https://cdn.test/{id}.mp3")
}

#[async_trait]
impl StreamLookup for FakeLookup {
    async fn lookup(&self, key: &LookupKey) -> Result<Vec<StreamCandidate>, LookupError> {
        self.calls.lock().unwrap().push(key.track_id.clone());

        let gate = self.gates.lock().unwrap().get(&key.track_id).cloned();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await.unwrap();
        }

        let reply = self.replies.lock().unwrap().get(&key.track_id).cloned();
        match reply {
            None => Ok(vec![candidate("160kbps", &default_stream_url(&key.track_id))]),
            Some(Reply::Candidates(c)) => Ok(c),
            Some(Reply::Unauthorized) => Err(LookupError::Unauthorized),
            Some(Reply::Status(code)) => Err(LookupError::Status(code)),
            Some(Reply::Hang) => std::future::pending().await,
        }
    }
}

pub struct CountingAuth {
    token: Mutex<Option<String>>,
    rejections: AtomicUsize,
}

impl CountingAuth {
    pub fn signed_in() -> Arc<Self> {
        Arc::new(Self {
            token: Mutex::new(Some("token".to_string())),
            rejections: AtomicUsize::new(0),
        })
    }

    pub fn signed_out() -> Arc<Self> {
        Arc::new(Self {
            token: Mutex::new(None),
            rejections: AtomicUsize::new(0),
        })
    }

    pub fn rejections(&self) -> usize {
        self.rejections.load(Ordering::SeqCst)
    }
}

impl AuthGateway for CountingAuth {
    fn access_token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    fn on_unauthorized(&self) -> Option<String> {
        self.rejections.fetch_add(1, Ordering::SeqCst);
        None
    }
}

/// What the fake backend knows about one opened resource.
#[derive(Debug, Clone)]
pub struct FakeResourceState {
    pub url: String,
    pub volume: f32,
    pub playing: bool,
    pub position_ms: u64,
    pub duration_ms: Option<u64>,
    pub released: bool,
    pub emitter: EventEmitter,
}

#[derive(Default)]
struct FakeAudioInner {
    resources: Vec<FakeResourceState>,
    fail_open: bool,
    fail_play: bool,
}

/// Shared view of everything the fake backend did. Cheap to clone.
#[derive(Clone, Default)]
pub struct FakeAudio {
    inner: Arc<Mutex<FakeAudioInner>>,
}

impl FakeAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend(&self) -> Box<dyn AudioBackend> {
        Box::new(FakeBackend {
            audio: self.clone(),
        })
    }

    pub fn opened(&self) -> usize {
        self.inner.lock().unwrap().resources.len()
    }

    pub fn live(&self) -> usize {
        self.inner
            .lock()
            .unwrap()
            .resources
            .iter()
            .filter(|r| !r.released)
            .count()
    }

    pub fn resource(&self, idx: usize) -> FakeResourceState {
        self.inner.lock().unwrap().resources[idx].clone()
    }

    pub fn last(&self) -> FakeResourceState {
        let inner = self.inner.lock().unwrap();
        inner.resources.last().cloned().expect("no resource opened")
    }

    pub fn set_position(&self, idx: usize, position_ms: u64) {
        self.inner.lock().unwrap().resources[idx].position_ms = position_ms;
    }

    pub fn set_duration(&self, idx: usize, duration_ms: u64) {
        self.inner.lock().unwrap().resources[idx].duration_ms = Some(duration_ms);
    }

    /// Emit as resource `idx` would. Returns whether the listener got it.
    pub fn emit(&self, idx: usize, kind: EngineEventKind) -> bool {
        let emitter = self.inner.lock().unwrap().resources[idx].emitter.clone();
        emitter.emit(kind)
    }

    pub fn fail_open(&self, fail: bool) {
        self.inner.lock().unwrap().fail_open = fail;
    }

    pub fn fail_play(&self, fail: bool) {
        self.inner.lock().unwrap().fail_play = fail;
    }
}

struct FakeBackend {
    audio: FakeAudio,
}

impl AudioBackend for FakeBackend {
    fn open(
        &mut self,
        stream_url: &str,
        volume: f32,
        emitter: EventEmitter,
    ) -> Result<Box<dyn AudioResource>, AudioError> {
        let mut inner = self.audio.inner.lock().unwrap();
        if inner.fail_open {
            return Err(AudioError::Decode("fake open failure".to_string()));
        }
        inner.resources.push(FakeResourceState {
            url: stream_url.to_string(),
            volume,
            playing: false,
            position_ms: 0,
            duration_ms: None,
            released: false,
            emitter,
        });
        Ok(Box::new(FakeResource {
            idx: inner.resources.len() - 1,
            audio: self.audio.clone(),
        }))
    }
}

struct FakeResource {
    idx: usize,
    audio: FakeAudio,
}

impl FakeResource {
    fn with<R>(&self, f: impl FnOnce(&mut FakeResourceState) -> R) -> R {
        let mut inner = self.audio.inner.lock().unwrap();
        f(&mut inner.resources[self.idx])
    }
}

impl AudioResource for FakeResource {
    fn play(&mut self) -> Result<(), AudioError> {
        if self.audio.inner.lock().unwrap().fail_play {
            return Err(AudioError::Decode("fake play failure".to_string()));
        }
        self.with(|r| r.playing = true);
        Ok(())
    }

    fn pause(&mut self) {
        self.with(|r| r.playing = false);
    }

    fn seek(&mut self, position_ms: u64) {
        self.with(|r| r.position_ms = position_ms);
    }

    fn set_volume(&mut self, volume: f32) {
        self.with(|r| r.volume = volume);
    }

    fn position_ms(&self) -> u64 {
        self.with(|r| r.position_ms)
    }

    fn duration_ms(&self) -> Option<u64> {
        self.with(|r| r.duration_ms)
    }

    fn release(&mut self) {
        self.with(|r| {
            r.playing = false;
            r.released = true;
        });
    }
}
