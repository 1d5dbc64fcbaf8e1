use serde::{Deserialize, Serialize};

/// A credited artist on a track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// The album a track belongs to, with optional artwork.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

/// Catalog metadata for a playable item.
///
/// Field names follow the catalog's JSON (`name`, `duration_ms`, `preview_url`)
/// so catalog pages and persisted sessions deserialize without a mapping layer.
/// `duration_ms` is advisory; the loaded stream reports the real duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    pub id: String,
    #[serde(rename = "name", alias = "title")]
    pub title: String,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub album: AlbumRef,
    #[serde(rename = "preview_url", default)]
    pub catalog_preview_url: Option<String>,
}

impl TrackDescriptor {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            duration_ms: 0,
            artists: Vec::new(),
            album: AlbumRef::default(),
            catalog_preview_url: None,
        }
    }

    pub fn with_artist(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.artists.push(ArtistRef {
            id: id.into(),
            name: name.into(),
        });
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_preview_url(mut self, url: impl Into<String>) -> Self {
        self.catalog_preview_url = Some(url.into());
        self
    }

    /// First credited artist, used for title+artist lookups.
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists
            .first()
            .map(|a| a.name.trim())
            .filter(|n| !n.is_empty())
    }

    /// All artist names joined with ", ".
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn artwork_url(&self) -> Option<&str> {
        self.album.images.first().map(|i| i.url.as_str())
    }
}

/// A playable URL for a catalog track. Superseded, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStream {
    pub source_track_id: String,
    pub stream_url: String,
    pub quality_tag: String,
}
