use super::types::{
    AudioBackend, AudioError, AudioResource, EngineEvent, Listener, ResourceId, Subscription,
    clamp_volume, subscribe,
};

struct Loaded {
    resource: Box<dyn AudioResource>,
    subscription: Subscription,
    stream_url: String,
}

impl Drop for Loaded {
    fn drop(&mut self) {
        // Listener first, so nothing the teardown triggers can leak out.
        self.subscription.detach();
        self.resource.release();
    }
}

/// Owner of the single live audio resource.
pub struct AudioEngine {
    backend: Box<dyn AudioBackend>,
    listener: Listener,
    loaded: Option<Loaded>,
    volume: f32,
}

impl AudioEngine {
    pub fn new(backend: Box<dyn AudioBackend>, volume: f32, listener: Listener) -> Self {
        Self {
            backend,
            listener,
            loaded: None,
            volume: clamp_volume(volume),
        }
    }

    /// Tear down the current resource (if any) and open a new paused one.
    pub fn load(&mut self, stream_url: &str, initial_volume: f32) -> Result<ResourceId, AudioError> {
        self.unload();
        self.volume = clamp_volume(initial_volume);

        let id = ResourceId::next();
        let (subscription, emitter) = subscribe(id, self.listener.clone());
        let resource = self.backend.open(stream_url, self.volume, emitter)?;
        tracing::debug!(resource = id.get(), %stream_url, "audio resource loaded");

        self.loaded = Some(Loaded {
            resource,
            subscription,
            stream_url: stream_url.to_string(),
        });
        Ok(id)
    }

    /// Release the current resource. No-op when nothing is loaded.
    pub fn unload(&mut self) {
        if let Some(old) = self.loaded.take() {
            tracing::debug!(resource = old.subscription.resource().get(), "audio resource released");
            drop(old);
        }
    }

    /// Pause the live resource and cut its listener. The resource stays
    /// loaded until the next `load` or `unload`, but none of its events are
    /// delivered or accepted from here on.
    pub fn detach(&mut self) {
        if let Some(l) = self.loaded.as_mut() {
            l.subscription.detach();
            l.resource.pause();
            tracing::debug!(resource = l.subscription.resource().get(), "audio resource detached");
        }
    }

    pub fn play(&mut self) -> Result<(), AudioError> {
        match self.loaded.as_mut() {
            Some(l) => l.resource.play(),
            None => Err(AudioError::NotLoaded),
        }
    }

    pub fn pause(&mut self) {
        if let Some(l) = self.loaded.as_mut() {
            l.resource.pause();
        }
    }

    pub fn seek(&mut self, position_ms: u64) {
        if let Some(l) = self.loaded.as_mut() {
            l.resource.seek(position_ms);
        }
    }

    /// Record `volume` for the session and apply it to the live resource, if any.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_volume(volume);
        if let Some(l) = self.loaded.as_mut() {
            l.resource.set_volume(self.volume);
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn position_ms(&self) -> u64 {
        self.loaded.as_ref().map_or(0, |l| l.resource.position_ms())
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.loaded.as_ref().and_then(|l| l.resource.duration_ms())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn active_resource(&self) -> Option<ResourceId> {
        self.loaded.as_ref().map(|l| l.subscription.resource())
    }

    pub fn stream_url(&self) -> Option<&str> {
        self.loaded.as_ref().map(|l| l.stream_url.as_str())
    }

    /// Whether `event` came from the live resource. Anything else is stale.
    pub fn accept(&self, event: &EngineEvent) -> bool {
        match self.loaded.as_ref() {
            Some(l) => l.subscription.resource() == event.resource && l.subscription.is_attached(),
            None => false,
        }
    }
}
