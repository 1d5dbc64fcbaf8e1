use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::AudioSettings;

use super::sink::fetch_stream;
use super::thread::spawn_audio_thread;
use super::types::{
    AudioBackend, AudioCmd, AudioError, AudioResource, EventEmitter, PlaybackHandle,
    PlaybackInfo, ResourceId,
};

/// `AudioBackend` that plays through the default output device with `rodio`.
pub struct RodioBackend {
    tx: Sender<AudioCmd>,
    playback: PlaybackHandle,
    runtime: tokio::runtime::Handle,
    http: reqwest::Client,
    fetch_timeout: Duration,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl RodioBackend {
    /// Start the audio thread and wait until the output device is open.
    pub fn new(
        settings: &AudioSettings,
        runtime: tokio::runtime::Handle,
        http: reqwest::Client,
    ) -> Result<Self, AudioError> {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let playback: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));

        let join = spawn_audio_thread(
            rx,
            playback.clone(),
            Duration::from_millis(settings.progress_interval_ms.max(1)),
            ready_tx,
        );
        ready_rx.recv().map_err(|_| AudioError::ThreadGone)??;

        Ok(Self {
            tx,
            playback,
            runtime,
            http,
            fetch_timeout: Duration::from_millis(settings.fetch_timeout_ms),
            join: Mutex::new(Some(join)),
        })
    }

    /// Stop output and wait for the audio thread to finish.
    pub fn shutdown(&self) {
        let _ = self.tx.send(AudioCmd::Quit);
        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl Drop for RodioBackend {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl AudioBackend for RodioBackend {
    fn open(
        &mut self,
        stream_url: &str,
        volume: f32,
        emitter: EventEmitter,
    ) -> Result<Box<dyn AudioResource>, AudioError> {
        let id = emitter.resource();
        self.tx
            .send(AudioCmd::Open {
                id,
                volume,
                emitter,
            })
            .map_err(|_| AudioError::ThreadGone)?;

        let tx = self.tx.clone();
        let http = self.http.clone();
        let url = stream_url.to_string();
        let timeout = self.fetch_timeout;
        self.runtime.spawn(async move {
            let cmd = match fetch_stream(&http, &url, timeout).await {
                Ok(bytes) => AudioCmd::Data { id, bytes },
                Err(e) => AudioCmd::FetchFailed {
                    id,
                    reason: e.to_string(),
                },
            };
            let _ = tx.send(cmd);
        });

        Ok(Box::new(RodioResource {
            id,
            tx: self.tx.clone(),
            playback: self.playback.clone(),
            released: false,
        }))
    }
}

struct RodioResource {
    id: ResourceId,
    tx: Sender<AudioCmd>,
    playback: PlaybackHandle,
    released: bool,
}

impl RodioResource {
    fn info(&self) -> Option<PlaybackInfo> {
        self.playback
            .lock()
            .ok()
            .filter(|i| i.resource == Some(self.id))
            .map(|i| i.clone())
    }
}

impl AudioResource for RodioResource {
    fn play(&mut self) -> Result<(), AudioError> {
        self.tx
            .send(AudioCmd::Play(self.id))
            .map_err(|_| AudioError::ThreadGone)
    }

    fn pause(&mut self) {
        let _ = self.tx.send(AudioCmd::Pause(self.id));
    }

    fn seek(&mut self, position_ms: u64) {
        let _ = self.tx.send(AudioCmd::Seek {
            id: self.id,
            position: Duration::from_millis(position_ms),
        });
    }

    fn set_volume(&mut self, volume: f32) {
        let _ = self.tx.send(AudioCmd::SetVolume { id: self.id, volume });
    }

    fn position_ms(&self) -> u64 {
        self.info().map_or(0, |i| i.position.as_millis() as u64)
    }

    fn duration_ms(&self) -> Option<u64> {
        self.info()
            .and_then(|i| i.duration)
            .map(|d| d.as_millis() as u64)
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            let _ = self.tx.send(AudioCmd::Release(self.id));
        }
    }
}
