//! Playback error taxonomy.
//!
//! Every failure the controller can surface ends up as one of these. They are
//! cheap to clone because a single resolution result may be shared by several
//! waiters.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// The streaming service returned no candidate in an accepted quality tier.
    #[error("No playable stream available for this track")]
    NoStreamAvailable,

    /// Network or service failure while resolving a stream (includes timeouts).
    #[error("Failed to fetch song details: {0}")]
    ResolutionFailed(String),

    /// The audio resource failed to start or errored during playback.
    #[error("Error playing this track: {0}")]
    PlaybackFailed(String),

    /// A collaborator call was rejected because credentials are missing or expired.
    #[error("Not signed in (credentials missing or expired)")]
    Unauthenticated,
}

impl PlaybackError {
    /// Short machine-friendly tag, used in logs and the status line.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoStreamAvailable => "no-stream",
            Self::ResolutionFailed(_) => "resolution-failed",
            Self::PlaybackFailed(_) => "playback-failed",
            Self::Unauthenticated => "unauthenticated",
        }
    }
}
