use std::sync::Arc;

use crate::audio::{AudioBackend, EngineEvent};
use crate::config::PlaybackSettings;
use crate::error::PlaybackError;
use crate::resolver::StreamResolver;
use crate::session::SessionStore;
use crate::track::ResolvedStream;

/// Where the controller is in its lifecycle.
///
/// `Playing` implies a resolved stream and a loaded resource; `Error` keeps
/// the reason until the next selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Resolving,
    Ready,
    Playing,
    Paused,
    Error(PlaybackError),
}

impl PlaybackState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Resolving => "loading",
            Self::Ready => "ready",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Error(_) => "error",
        }
    }

    /// States in which a resource is loaded and transport controls apply.
    pub fn has_stream(&self) -> bool {
        matches!(self, Self::Ready | Self::Playing | Self::Paused)
    }
}

/// Work finished off the event loop, delivered back to it.
#[derive(Debug, Clone)]
pub enum ControllerEvent {
    /// A resolution started at `generation` settled.
    Resolved {
        generation: u64,
        track_id: String,
        outcome: Result<ResolvedStream, PlaybackError>,
    },
    /// Something the audio engine's resources reported.
    Engine(EngineEvent),
}

/// Collaborators the controller is built from.
pub struct ControllerParts {
    pub resolver: Arc<StreamResolver>,
    pub backend: Box<dyn AudioBackend>,
    pub session: SessionStore,
    pub settings: PlaybackSettings,
    pub runtime: tokio::runtime::Handle,
}

/// Quality tag used when the catalog preview stands in for a full stream.
pub const PREVIEW_QUALITY: &str = "preview";
