use crate::config::TrackDisplayField;

use super::model::TrackDescriptor;

/// Build the now-playing text for `track` from the configured `fields`.
///
/// Empty fields are skipped; falls back to the title when nothing was produced.
pub fn display_from_fields(track: &TrackDescriptor, fields: &[TrackDisplayField], sep: &str) -> String {
    let mut parts: Vec<String> = Vec::new();

    for f in fields {
        match f {
            TrackDisplayField::Title => {
                if !track.title.trim().is_empty() {
                    parts.push(track.title.trim().to_string());
                }
            }
            TrackDisplayField::Artist => {
                let names = track.artist_names();
                if !names.trim().is_empty() {
                    parts.push(names.trim().to_string());
                }
            }
            TrackDisplayField::Album => {
                let album = track.album.name.trim();
                if !album.is_empty() {
                    parts.push(album.to_string());
                }
            }
        }
    }

    if parts.is_empty() {
        track.title.clone()
    } else {
        parts.join(sep)
    }
}

/// Format milliseconds as `m:ss`.
pub fn format_mmss(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}
