use earworm_core::TrackDescriptor;
use serde::{Deserialize, Serialize};

/// Which list the queue was taken from
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueueMode {
    #[default]
    Search,
    Favorites,
}

/// An ordered list of tracks with a pointer to the current one.
///
/// The index is always either `None` or a valid position in the list.
/// Navigation stops at both ends of the list.
#[derive(Debug, Default, Clone)]
pub struct QueueManager {
    tracks: Vec<TrackDescriptor>,
    index: Option<usize>,
    mode: QueueMode,
}

impl QueueManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the list.
    ///
    /// If the mode stays the same, the current track is looked up again in the new list.
    /// A different mode clears the selection until a track is picked explicitly.
    pub fn set_queue(&mut self, tracks: Vec<TrackDescriptor>, mode: QueueMode) {
        if mode == self.mode {
            self.replace_tracks(tracks);
        } else {
            self.tracks = tracks;
            self.mode = mode;
            self.index = None;
        }
    }

    /// Replaces the list only if it is the active one.
    /// Used when the favorites change while they are being played.
    pub fn sync_list(&mut self, tracks: Vec<TrackDescriptor>, mode: QueueMode) -> bool {
        if mode != self.mode {
            return false;
        }

        self.replace_tracks(tracks);
        true
    }

    /// Makes `tracks` the queue and selects the track with the given identifier in it.
    pub fn select_from(
        &mut self,
        tracks: Vec<TrackDescriptor>,
        mode: QueueMode,
        id: &str,
    ) -> Option<&TrackDescriptor> {
        self.tracks = tracks;
        self.mode = mode;

        self.select_by_track_id(id)
    }

    /// Selects the track with the given identifier, clearing the selection if it isn't queued.
    pub fn select_by_track_id(&mut self, id: &str) -> Option<&TrackDescriptor> {
        self.index = self.position_of(id);
        self.current()
    }

    /// Selects the track at `index`. Out of range indexes leave the selection alone.
    pub fn select_index(&mut self, index: usize) -> Option<&TrackDescriptor> {
        if index >= self.tracks.len() {
            return None;
        }

        self.index = Some(index);
        self.current()
    }

    /// Moves to the next track, returning it.
    /// Does nothing at the end of the queue or when nothing is selected.
    pub fn advance(&mut self) -> Option<&TrackDescriptor> {
        let next = self.index.map(|i| i + 1).filter(|i| *i < self.tracks.len())?;

        self.index = Some(next);
        self.current()
    }

    /// Moves to the previous track, returning it.
    /// Does nothing at the start of the queue or when nothing is selected.
    pub fn retreat(&mut self) -> Option<&TrackDescriptor> {
        let previous = self.index.and_then(|i| i.checked_sub(1))?;

        self.index = Some(previous);
        self.current()
    }

    /// Swaps the queued track that has the same identifier for `track`.
    pub fn replace_entry(&mut self, track: &TrackDescriptor) -> bool {
        match self.tracks.iter_mut().find(|t| t.id == track.id) {
            Some(entry) => {
                *entry = track.clone();
                true
            }
            None => false,
        }
    }

    pub fn current(&self) -> Option<&TrackDescriptor> {
        self.index.and_then(|i| self.tracks.get(i))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.index
    }

    pub fn has_next(&self) -> bool {
        self.index.is_some_and(|i| i + 1 < self.tracks.len())
    }

    pub fn has_previous(&self) -> bool {
        self.index.is_some_and(|i| i > 0)
    }

    pub fn mode(&self) -> QueueMode {
        self.mode
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

    fn replace_tracks(&mut self, tracks: Vec<TrackDescriptor>) {
        let current_id = self.current().map(|t| t.id.clone());

        self.tracks = tracks;
        self.index = current_id.and_then(|id| self.position_of(&id));
    }

    fn position_of(&self, id: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }
}
