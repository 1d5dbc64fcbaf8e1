use async_trait::async_trait;
use thiserror::Error;

use crate::track::TrackDescriptor;

/// What the resolution service is asked about.
///
/// The service maps unknown ids to a title+artist search on its own side;
/// we just hand over everything it might need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupKey {
    pub track_id: String,
    pub title: String,
    pub primary_artist: Option<String>,
}

impl LookupKey {
    pub fn for_track(track: &TrackDescriptor) -> Self {
        Self {
            track_id: track.id.clone(),
            title: track.title.clone(),
            primary_artist: track.primary_artist().map(str::to_string),
        }
    }

    /// `"<title> <artist>"`, or `None` when there is no title to search for.
    pub fn search_query(&self) -> Option<String> {
        let title = self.title.trim();
        if title.is_empty() {
            return None;
        }
        match self.primary_artist.as_deref().map(str::trim) {
            Some(a) if !a.is_empty() => Some(format!("{title} {a}")),
            _ => Some(title.to_string()),
        }
    }
}

/// One downloadable variant offered by the service. Unordered, best effort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamCandidate {
    pub quality_tag: String,
    pub url: String,
}

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("credentials rejected by resolution service")]
    Unauthorized,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("resolution service returned status {0}")]
    Status(u16),
    #[error("unexpected response from resolution service: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait StreamLookup: Send + Sync {
    async fn lookup(&self, key: &LookupKey) -> Result<Vec<StreamCandidate>, LookupError>;
}
