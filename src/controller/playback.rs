use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::audio::{AudioEngine, EngineEvent, EngineEventKind, Listener};
use crate::config::PlaybackSettings;
use crate::error::PlaybackError;
use crate::queue::Queue;
use crate::resolver::StreamResolver;
use crate::session::{SessionSnapshot, SessionStore};
use crate::track::{ResolvedStream, TrackDescriptor};

use super::model::{ControllerEvent, ControllerParts, PREVIEW_QUALITY, PlaybackState};

/// Volume restored by unmute when nothing sensible was remembered.
const UNMUTE_VOLUME: f32 = 0.5;

pub struct PlaybackController {
    state: PlaybackState,
    queue: Queue,
    current: Option<TrackDescriptor>,
    resolved: Option<ResolvedStream>,
    loading_track_id: Option<String>,
    /// Bumped on every activation; only the resolution tagged with the latest value applies.
    generation: u64,
    play_when_ready: bool,
    progress_ms: u64,
    duration_ms: u64,
    last_error: Option<PlaybackError>,
    volume_before_mute: Option<f32>,

    engine: AudioEngine,
    resolver: Arc<StreamResolver>,
    session: SessionStore,
    settings: PlaybackSettings,
    events: UnboundedSender<ControllerEvent>,
    runtime: tokio::runtime::Handle,
}

impl PlaybackController {
    /// Build the controller. Every `ControllerEvent` it needs to see arrives
    /// on the returned receiver; feed them back through `handle_event`.
    pub fn new(parts: ControllerParts) -> (Self, UnboundedReceiver<ControllerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();

        let engine_tx = tx.clone();
        let listener: Listener = Arc::new(move |ev: EngineEvent| {
            let _ = engine_tx.send(ControllerEvent::Engine(ev));
        });

        let volume = parts
            .session
            .load_volume()
            .unwrap_or(parts.settings.default_volume);

        let controller = Self {
            state: PlaybackState::Idle,
            queue: Queue::new(),
            current: None,
            resolved: None,
            loading_track_id: None,
            generation: 0,
            play_when_ready: false,
            progress_ms: 0,
            duration_ms: 0,
            last_error: None,
            volume_before_mute: None,
            engine: AudioEngine::new(parts.backend, volume, listener),
            resolver: parts.resolver,
            session: parts.session,
            settings: parts.settings,
            events: tx,
            runtime: parts.runtime,
        };
        (controller, rx)
    }

    /// Sender for the controller's own event channel.
    pub fn events(&self) -> UnboundedSender<ControllerEvent> {
        self.events.clone()
    }

    pub fn handle_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::Resolved {
                generation,
                track_id,
                outcome,
            } => self.on_resolved(generation, &track_id, outcome),
            ControllerEvent::Engine(ev) => self.on_engine_event(ev),
        }
    }

    // ---- operations ----

    /// Make `track` current and start resolving it.
    ///
    /// Re-selecting the track that is already playing toggles instead.
    pub fn select_track(&mut self, track: TrackDescriptor) {
        let autoplay = self.settings.autoplay;
        self.activate(track, autoplay);
    }

    pub fn play(&mut self) {
        if !matches!(self.state, PlaybackState::Ready | PlaybackState::Paused) {
            return;
        }
        match self.engine.play() {
            Ok(()) => {
                self.state = PlaybackState::Playing;
                self.last_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "playback failed to start");
                self.last_error = Some(PlaybackError::PlaybackFailed(e.to_string()));
                self.state = PlaybackState::Paused;
            }
        }
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.engine.pause();
            self.state = PlaybackState::Paused;
        }
    }

    /// No-op unless a stream is loaded.
    pub fn toggle_play(&mut self) {
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Ready | PlaybackState::Paused => self.play(),
            _ => {}
        }
    }

    /// Seek within the loaded stream, clamped to its duration when known.
    pub fn seek_to(&mut self, position_ms: u64) {
        if !self.state.has_stream() {
            return;
        }
        let upper = self.engine.duration_ms().unwrap_or(self.duration_ms);
        let target = if upper > 0 {
            position_ms.min(upper)
        } else {
            position_ms
        };
        self.engine.seek(target);
        self.progress_ms = target;
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.engine.set_volume(volume);
        if self.engine.volume() > 0.0 {
            self.volume_before_mute = None;
        }
        self.persist_volume();
    }

    pub fn toggle_mute(&mut self) {
        let current = self.engine.volume();
        if current > 0.0 {
            self.set_volume(0.0);
            self.volume_before_mute = Some(current);
        } else {
            let restored = self
                .volume_before_mute
                .take()
                .filter(|v| *v > 0.0)
                .unwrap_or(UNMUTE_VOLUME);
            self.set_volume(restored);
        }
    }

    /// Activate the track after the current one, wrapping to the first.
    pub fn next(&mut self) {
        let autoplay = self.settings.autoplay;
        self.advance(autoplay);
    }

    /// Restart the current track when past the threshold, otherwise activate
    /// the one before it (wrapping to the last).
    pub fn previous(&mut self) {
        if self.playback_position_ms() > self.settings.restart_threshold_ms {
            self.seek_to(0);
            return;
        }
        if let Some(track) = self.queue.previous_from_current().cloned() {
            let autoplay = self.settings.autoplay;
            self.activate(track, autoplay);
        }
    }

    pub fn set_queue(&mut self, tracks: Vec<TrackDescriptor>) {
        self.queue.set_queue(tracks);
    }

    pub fn add_to_queue(&mut self, track: TrackDescriptor) {
        self.queue.add_to_queue(track);
    }

    /// Rebuild the last session's track as `Ready`. Never starts playback.
    ///
    /// Returns whether anything was restored.
    pub fn restore_session(&mut self) -> bool {
        let Some(snapshot) = self.session.load() else {
            return false;
        };

        if let Err(e) = self.engine.load(&snapshot.resolved_stream_url, snapshot.volume) {
            tracing::warn!(error = %e, "could not restore last session");
            return false;
        }

        let track = snapshot.track;
        tracing::info!(track_id = %track.id, "restored last session");

        self.generation += 1;
        self.queue.set_current(track.id.clone());
        self.resolved = Some(ResolvedStream {
            source_track_id: track.id.clone(),
            stream_url: snapshot.resolved_stream_url,
            quality_tag: snapshot.quality_tag.unwrap_or_default(),
        });
        self.duration_ms = track.duration_ms;
        self.progress_ms = 0;
        self.current = Some(track);
        self.loading_track_id = None;
        self.play_when_ready = false;
        self.last_error = None;
        self.state = PlaybackState::Ready;
        true
    }

    // ---- accessors ----

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn current_track(&self) -> Option<&TrackDescriptor> {
        self.current.as_ref()
    }

    pub fn resolved_stream(&self) -> Option<&ResolvedStream> {
        self.resolved.as_ref()
    }

    /// Id of the track being resolved, while in `Resolving`.
    pub fn loading_track_id(&self) -> Option<&str> {
        self.loading_track_id.as_deref()
    }

    pub fn progress_ms(&self) -> u64 {
        self.progress_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn volume(&self) -> f32 {
        self.engine.volume()
    }

    pub fn is_muted(&self) -> bool {
        self.engine.volume() <= 0.0
    }

    pub fn last_error(&self) -> Option<&PlaybackError> {
        self.last_error.as_ref()
    }

    pub fn error_message(&self) -> Option<String> {
        self.last_error.as_ref().map(|e| e.to_string())
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ---- internals ----

    fn activate(&mut self, track: TrackDescriptor, play_when_ready: bool) {
        if self.state == PlaybackState::Playing
            && self.current.as_ref().is_some_and(|c| c.id == track.id)
        {
            self.toggle_play();
            return;
        }

        self.generation += 1;
        let generation = self.generation;

        // Nothing the outgoing resource reports may touch state while we resolve.
        self.engine.detach();

        tracing::info!(track_id = %track.id, generation, "activating track");
        self.queue.set_current(track.id.clone());
        self.loading_track_id = Some(track.id.clone());
        self.resolved = None;
        self.last_error = None;
        self.play_when_ready = play_when_ready;
        self.progress_ms = 0;
        self.duration_ms = track.duration_ms;
        self.state = PlaybackState::Resolving;

        let flight = self.resolver.resolve(&track);
        let tx = self.events.clone();
        let track_id = track.id.clone();
        self.current = Some(track);

        self.runtime.spawn(async move {
            let outcome = flight.await;
            let _ = tx.send(ControllerEvent::Resolved {
                generation,
                track_id,
                outcome,
            });
        });
    }

    fn advance(&mut self, play_when_ready: bool) {
        if let Some(track) = self.queue.next_from_current().cloned() {
            self.activate(track, play_when_ready);
        }
    }

    fn on_resolved(
        &mut self,
        generation: u64,
        track_id: &str,
        outcome: Result<ResolvedStream, PlaybackError>,
    ) {
        let current_id = self.current.as_ref().map(|t| t.id.as_str());
        if generation != self.generation
            || self.state != PlaybackState::Resolving
            || current_id != Some(track_id)
        {
            tracing::debug!(%track_id, generation, latest = self.generation, "discarding stale resolution");
            return;
        }
        let Some(track) = self.current.clone() else {
            return;
        };
        self.loading_track_id = None;

        let outcome = match outcome {
            Err(PlaybackError::NoStreamAvailable) => self.preview_stream(&track),
            other => other,
        };

        match outcome {
            Ok(stream) => self.on_stream_ready(stream),
            Err(e) => self.fail(e),
        }
    }

    fn preview_stream(&self, track: &TrackDescriptor) -> Result<ResolvedStream, PlaybackError> {
        match track.catalog_preview_url.as_deref() {
            Some(url) if self.settings.preview_fallback && !url.trim().is_empty() => {
                tracing::info!(track_id = %track.id, "no full stream, using catalog preview");
                Ok(ResolvedStream {
                    source_track_id: track.id.clone(),
                    stream_url: url.to_string(),
                    quality_tag: PREVIEW_QUALITY.to_string(),
                })
            }
            _ => Err(PlaybackError::NoStreamAvailable),
        }
    }

    fn on_stream_ready(&mut self, stream: ResolvedStream) {
        let volume = self.engine.volume();
        if let Err(e) = self.engine.load(&stream.stream_url, volume) {
            self.fail(PlaybackError::PlaybackFailed(e.to_string()));
            return;
        }

        tracing::info!(
            track_id = %stream.source_track_id,
            quality = %stream.quality_tag,
            "stream ready"
        );
        self.resolved = Some(stream);
        self.state = PlaybackState::Ready;
        self.persist_snapshot();

        if self.play_when_ready {
            self.play_when_ready = false;
            self.play();
        }
    }

    fn on_engine_event(&mut self, event: EngineEvent) {
        if !self.engine.accept(&event) {
            tracing::debug!(resource = event.resource.get(), "ignoring event from inactive resource");
            return;
        }

        match event.kind {
            EngineEventKind::Progress {
                current_ms,
                duration_ms,
            } => {
                self.progress_ms = current_ms;
                if let Some(d) = duration_ms.filter(|d| *d > 0) {
                    self.duration_ms = d;
                }
            }
            EngineEventKind::Ended => {
                tracing::debug!("track ended");
                self.progress_ms = self.duration_ms;
                if self.state == PlaybackState::Playing {
                    self.state = PlaybackState::Paused;
                }
                self.advance(true);
            }
            EngineEventKind::Error(reason) => {
                tracing::warn!(%reason, "audio resource error");
                let err = PlaybackError::PlaybackFailed(reason);
                self.last_error = Some(err.clone());
                self.state = PlaybackState::Error(err);
            }
        }
    }

    fn fail(&mut self, err: PlaybackError) {
        tracing::warn!(kind = err.kind(), error = %err, "track activation failed");
        self.engine.unload();
        self.resolved = None;
        self.loading_track_id = None;
        self.play_when_ready = false;
        self.last_error = Some(err.clone());
        self.state = PlaybackState::Error(err);
    }

    /// Position used by `previous()`; zero unless a stream is loaded.
    fn playback_position_ms(&self) -> u64 {
        if self.state.has_stream() {
            self.engine.position_ms()
        } else {
            0
        }
    }

    fn snapshot(&self) -> Option<SessionSnapshot> {
        let track = self.current.as_ref()?;
        let stream = self.resolved.as_ref()?;
        Some(SessionSnapshot {
            track: track.clone(),
            resolved_stream_url: stream.stream_url.clone(),
            quality_tag: Some(stream.quality_tag.clone()),
            volume: self.engine.volume(),
        })
    }

    fn persist_snapshot(&self) {
        if let Some(snapshot) = self.snapshot() {
            if let Err(e) = self.session.save(&snapshot) {
                tracing::warn!(error = %e, "failed to save session");
            }
        }
    }

    fn persist_volume(&self) {
        let result = match self.snapshot() {
            Some(snapshot) => self.session.save(&snapshot),
            None => self.session.save_volume(self.engine.volume()),
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to save volume");
        }
    }
}
