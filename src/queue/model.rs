use crate::track::TrackDescriptor;

/// Ordered sequence of tracks with "current" tracked by id, not position.
///
/// `current_track_id` may name a track that is not in `tracks` (it was picked
/// from search results, or the queue was replaced underneath it). Navigation
/// then wraps to the first/last element.
#[derive(Debug, Clone, Default)]
pub struct Queue {
    tracks: Vec<TrackDescriptor>,
    current_track_id: Option<String>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole sequence. The current pointer is left alone.
    pub fn set_queue(&mut self, tracks: Vec<TrackDescriptor>) {
        self.tracks = tracks;
    }

    /// Append a single track at the end.
    pub fn add_to_queue(&mut self, track: TrackDescriptor) {
        self.tracks.push(track);
    }

    pub fn set_current(&mut self, id: impl Into<String>) {
        self.current_track_id = Some(id.into());
    }

    pub fn current_track_id(&self) -> Option<&str> {
        self.current_track_id.as_deref()
    }

    pub fn tracks(&self) -> &[TrackDescriptor] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&TrackDescriptor> {
        self.tracks.get(idx)
    }

    /// Position of the track with `id`, by linear scan.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    /// The track after the current one, wrapping to the first.
    ///
    /// With no current track this is the first element. `None` only when empty.
    pub fn next_from_current(&self) -> Option<&TrackDescriptor> {
        if self.tracks.is_empty() {
            return None;
        }

        let pos = self.current_track_id.as_deref().and_then(|id| self.position_of(id));
        match pos {
            Some(p) if p + 1 < self.tracks.len() => self.tracks.get(p + 1),
            _ => self.tracks.first(),
        }
    }

    /// The track before the current one, wrapping to the last.
    ///
    /// With no current track (or one not in the queue) this is the last element.
    pub fn previous_from_current(&self) -> Option<&TrackDescriptor> {
        if self.tracks.is_empty() {
            return None;
        }

        let pos = self.current_track_id.as_deref().and_then(|id| self.position_of(id));
        match pos {
            Some(p) if p > 0 => self.tracks.get(p - 1),
            _ => self.tracks.last(),
        }
    }
}
