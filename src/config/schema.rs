use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/legato/config.toml` or `~/.config/legato/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `LEGATO__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub resolver: ResolverSettings,
    pub playback: PlaybackSettings,
    pub audio: AudioSettings,
    pub session: SessionSettings,
    pub auth: AuthSettings,
    pub controls: ControlsSettings,
    pub logging: LoggingSettings,
    pub ui: UiSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Base URL of the stream-resolution service.
    pub base_url: String,
    /// Quality tier tried first.
    pub preferred_quality: String,
    /// Quality tier accepted when the preferred one is missing.
    pub fallback_quality: String,
    /// Upper bound for a single resolution (milliseconds).
    pub timeout_ms: u64,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            base_url: "https://saavn.dev/api".to_string(),
            preferred_quality: "160kbps".to_string(),
            fallback_quality: "96kbps".to_string(),
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// "Previous" restarts the current track when past this position.
    pub restart_threshold_ms: u64,
    /// Volume used when no session volume was saved.
    pub default_volume: f32,
    /// Step applied by the `+` / `-` keys.
    pub volume_step: f32,
    /// Start playing as soon as a selected track is ready.
    pub autoplay: bool,
    /// Play the catalog preview when no full stream is available.
    pub preview_fallback: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            restart_threshold_ms: 3000,
            default_volume: 0.7,
            volume_step: 0.05,
            autoplay: true,
            preview_fallback: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// How often progress is reported while playing (milliseconds).
    pub progress_interval_ms: u64,
    /// Upper bound for downloading one stream (milliseconds).
    pub fetch_timeout_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            progress_interval_ms: 200,
            fetch_timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Remember the last track and volume across restarts.
    pub enabled: bool,
    /// Where session files live. Defaults to the XDG data dir.
    pub dir: Option<PathBuf>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Bearer token for the resolution service.
    ///
    /// Usually supplied as `LEGATO__AUTH__ACCESS_TOKEN` rather than written to disk.
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self { scrub_seconds: 5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Log file. Defaults to `legato.log` in the session dir.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Which track fields to show in the status line, and in what order.
    ///
    /// Example: ["artist", "title", "album"]
    pub now_playing_track_fields: Vec<TrackDisplayField>,

    /// Separator used to join `now_playing_track_fields`.
    pub now_playing_track_separator: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            now_playing_track_fields: vec![TrackDisplayField::Artist, TrackDisplayField::Title],
            now_playing_track_separator: " - ".to_string(),
        }
    }
}

#[derive(Debug, Copy, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackDisplayField {
    #[serde(alias = "name")]
    Title,
    #[serde(alias = "artists")]
    Artist,
    Album,
}
