//! Reading catalog output from disk.
//!
//! The catalog service is not part of this program; whatever fetched the
//! tracks leaves them as JSON. Three page shapes are accepted: a bare array
//! of tracks, a playlist page (`{"items": [{"track": ...}]}`) and a search
//! page (`{"tracks": {"items": [...]}}`). Null entries (removed tracks) are
//! skipped and order is preserved.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::model::TrackDescriptor;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogPage {
    Tracks(Vec<Option<TrackDescriptor>>),
    Playlist { items: Vec<PlaylistItem> },
    Search { tracks: SearchTracks },
}

#[derive(Deserialize)]
struct PlaylistItem {
    #[serde(default)]
    track: Option<TrackDescriptor>,
}

#[derive(Deserialize)]
struct SearchTracks {
    #[serde(default)]
    items: Vec<Option<TrackDescriptor>>,
}

/// Parse a catalog page into an ordered sequence of tracks.
pub fn parse_tracks(json: &str) -> Result<Vec<TrackDescriptor>, CatalogError> {
    let page: CatalogPage = serde_json::from_str(json)?;
    let tracks = match page {
        CatalogPage::Tracks(items) => items.into_iter().flatten().collect(),
        CatalogPage::Playlist { items } => items.into_iter().filter_map(|i| i.track).collect(),
        CatalogPage::Search { tracks } => tracks.items.into_iter().flatten().collect(),
    };
    Ok(tracks)
}

/// Read and parse a catalog page from `path`.
pub fn load_tracks(path: &Path) -> Result<Vec<TrackDescriptor>, CatalogError> {
    let raw = std::fs::read_to_string(path)?;
    parse_tracks(&raw)
}
