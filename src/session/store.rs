use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::clamp_volume;
use crate::track::TrackDescriptor;

/// Combined record: `{ "track": <track + resolved_stream_url>, "volume": f32 }`.
pub const SESSION_FILE: &str = "current_track.json";
/// Scalar volume, consulted when the combined record is absent.
pub const VOLUME_FILE: &str = "player_volume";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// What gets restored at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub track: TrackDescriptor,
    pub resolved_stream_url: String,
    pub quality_tag: Option<String>,
    pub volume: f32,
}

#[derive(Serialize, Deserialize)]
struct StoredTrack {
    #[serde(flatten)]
    track: TrackDescriptor,
    resolved_stream_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    quality_tag: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct StoredSession {
    track: StoredTrack,
    volume: f32,
}

fn valid_volume(v: f32) -> Option<f32> {
    if v.is_finite() { Some(clamp_volume(v)) } else { None }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: Option<PathBuf>,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// A store that remembers nothing.
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    fn path(&self, name: &str) -> Option<PathBuf> {
        self.dir.as_ref().map(|d| d.join(name))
    }

    pub fn load(&self) -> Option<SessionSnapshot> {
        let path = self.path(SESSION_FILE)?;
        let raw = fs::read_to_string(&path).ok()?;
        let stored: StoredSession = match serde_json::from_str(&raw) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed session record");
                return None;
            }
        };
        if stored.track.track.id.is_empty() || stored.track.resolved_stream_url.is_empty() {
            return None;
        }

        Some(SessionSnapshot {
            track: stored.track.track,
            resolved_stream_url: stored.track.resolved_stream_url,
            quality_tag: stored.track.quality_tag,
            volume: valid_volume(stored.volume)?,
        })
    }

    /// Volume from the combined record, else from the scalar file.
    pub fn load_volume(&self) -> Option<f32> {
        if let Some(s) = self.load() {
            return Some(s.volume);
        }
        let raw = fs::read_to_string(self.path(VOLUME_FILE)?).ok()?;
        raw.trim().parse::<f32>().ok().and_then(valid_volume)
    }

    pub fn save(&self, snapshot: &SessionSnapshot) -> Result<(), SessionError> {
        let Some(path) = self.path(SESSION_FILE) else {
            return Ok(());
        };
        let stored = StoredSession {
            track: StoredTrack {
                track: snapshot.track.clone(),
                resolved_stream_url: snapshot.resolved_stream_url.clone(),
                quality_tag: snapshot.quality_tag.clone(),
            },
            volume: snapshot.volume,
        };
        write_atomic(&path, &serde_json::to_vec_pretty(&stored)?)?;
        // Keep the scalar in step so it never disagrees with the record.
        self.write_scalar_volume(snapshot.volume)
    }

    /// Persist `volume` on its own, patching it into the combined record
    /// when one exists so a later `load_volume` never sees an older value.
    pub fn save_volume(&self, volume: f32) -> Result<(), SessionError> {
        if let Some(path) = self.path(SESSION_FILE) {
            let stored = fs::read_to_string(&path)
                .ok()
                .and_then(|raw| serde_json::from_str::<StoredSession>(&raw).ok());
            if let Some(mut stored) = stored {
                stored.volume = volume;
                write_atomic(&path, &serde_json::to_vec_pretty(&stored)?)?;
            }
        }
        self.write_scalar_volume(volume)
    }

    fn write_scalar_volume(&self, volume: f32) -> Result<(), SessionError> {
        let Some(path) = self.path(VOLUME_FILE) else {
            return Ok(());
        };
        write_atomic(&path, volume.to_string().as_bytes())?;
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}
