use earworm_core::TrackDescriptor;
use log::{debug, warn};
use parking_lot::Mutex;
use thiserror::Error;

use crate::{
    format_time, BoxedMediaElement, BoxedProgressTrack, BoxedStorageSlot, BoxedStreamSource,
    Favorites, MediaError, PlaybackController, PointerEvent, QueueManager, QueueMode,
    ScrubAction, ScrubController, ScrubGate, SelectionId, SourceError, StorageError,
    TransportCommand, TransportState, VolumeState,
};

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Could not find the track: {0}")]
    Source(#[from] SourceError),
    #[error("Track {0} has nothing to search for")]
    NoQuery(String),
    #[error("Playback could not start: {0}")]
    PlaybackStart(#[from] MediaError),
    #[error("Could not save favorites: {0}")]
    Storage(#[from] StorageError),
    #[error("Could not encode favorites: {0}")]
    Encode(#[from] serde_json::Error),
}

/// How a request to play a track ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The track is playing.
    Started,
    /// Another track was selected before this one started.
    Superseded,
    /// Nothing was selected, for example when skipping past the end of the queue.
    Unchanged,
}

/// Everything a front-end needs to render the player
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub state: TransportState,
    pub current: Option<TrackDescriptor>,
    pub status: String,
    pub position: f64,
    pub duration: Option<f64>,
    pub progress_percent: f64,
    /// The position as `m:ss`
    pub elapsed: String,
    /// The duration as `m:ss`
    pub total: String,
    pub volume: VolumeState,
    pub silent: bool,
    pub dragging: bool,
    pub queue_mode: QueueMode,
    pub queue_index: Option<usize>,
    pub has_next: bool,
    pub has_previous: bool,
    pub current_is_favorite: bool,
    pub favorites: Vec<TrackDescriptor>,
}

struct PlayerState {
    playback: PlaybackController,
    queue: QueueManager,
    scrub: ScrubController,
    favorites: Favorites,
}

/// Drives a media element from user intents and media events.
///
/// The state lock is never held across an await. Every load owns a [SelectionId]
/// and gives up as soon as a newer selection is made.
pub struct Player {
    state: Mutex<PlayerState>,
    media: BoxedMediaElement,
    source: BoxedStreamSource,
    track: BoxedProgressTrack,
    slot: BoxedStorageSlot,
}

impl Player {
    /// Creates a player, restoring the favorites from `slot`.
    pub async fn new(
        media: BoxedMediaElement,
        source: BoxedStreamSource,
        track: BoxedProgressTrack,
        slot: BoxedStorageSlot,
        volume: f64,
    ) -> Self {
        let favorites = Favorites::load(slot.as_ref()).await;
        let playback = PlaybackController::new(volume);

        let player = Self {
            state: Mutex::new(PlayerState {
                playback,
                queue: QueueManager::new(),
                scrub: ScrubController::new(),
                favorites,
            }),
            media,
            source,
            track,
            slot,
        };

        let volume = player.state.lock().playback.volume_state();
        player.apply_volume(volume);

        player
    }

    /// Plays a track picked from a list, making that list the queue.
    pub async fn play_from(
        &self,
        tracks: Vec<TrackDescriptor>,
        mode: QueueMode,
        id: &str,
    ) -> Result<LoadOutcome, PlayerError> {
        let track = self.state.lock().queue.select_from(tracks, mode, id).cloned();
        self.load_selected(track).await
    }

    /// Plays the track at `index` in the current queue.
    pub async fn play_index(&self, index: usize) -> Result<LoadOutcome, PlayerError> {
        let track = self.state.lock().queue.select_index(index).cloned();
        self.load_selected(track).await
    }

    pub async fn next(&self) -> Result<LoadOutcome, PlayerError> {
        let track = self.state.lock().queue.advance().cloned();
        self.load_selected(track).await
    }

    pub async fn previous(&self) -> Result<LoadOutcome, PlayerError> {
        let track = self.state.lock().queue.retreat().cloned();
        self.load_selected(track).await
    }

    /// Plays or pauses the current track, restarting it if it ended.
    pub async fn toggle_play(&self) -> Option<TransportCommand> {
        let command = self.state.lock().playback.toggle()?;

        match command {
            TransportCommand::Pause => self.media.pause(),
            TransportCommand::Play => self.resume_media().await,
            TransportCommand::Restart => {
                self.media.seek(0.);
                self.resume_media().await;
            }
        }

        Some(command)
    }

    /// Handles the media element reaching the end, moving on to the next track if there is one.
    pub async fn handle_ended(&self) -> Result<LoadOutcome, PlayerError> {
        let next = {
            let mut state = self.state.lock();

            if !state.playback.on_ended() {
                return Ok(LoadOutcome::Unchanged);
            }

            state.queue.advance().cloned()
        };

        self.load_selected(next).await
    }

    /// Progress reported by the media element. Ignored while the user is scrubbing.
    pub fn handle_time_update(&self, position: f64, duration: Option<f64>) {
        let mut state = self.state.lock();

        if !state.scrub.is_dragging() {
            state.playback.sync_progress(position, duration);
        }
    }

    pub fn handle_metadata(&self, duration: Option<f64>) {
        self.state.lock().playback.sync_duration(duration);
    }

    /// Handles the media element failing outside of a load.
    pub fn handle_media_error(&self) {
        let failed = self.state.lock().playback.media_error();

        if failed {
            self.media.clear_source();
        }
    }

    pub fn set_volume(&self, volume: f64) -> VolumeState {
        let volume = self.state.lock().playback.set_volume(volume);
        self.apply_volume(volume);

        volume
    }

    pub fn toggle_mute(&self) -> VolumeState {
        let volume = self.state.lock().playback.toggle_mute();
        self.apply_volume(volume);

        volume
    }

    pub fn pointer_down(&self, event: PointerEvent) {
        let bounds = self.track.bounds();

        let actions = {
            let mut state = self.state.lock();
            let gate = ScrubGate {
                loaded: state.playback.is_loaded(),
                playing: state.playback.is_playing(),
                duration: state.playback.duration(),
            };

            state.scrub.pointer_down(event, bounds, gate)
        };

        for action in actions {
            self.apply_scrub(action);
        }
    }

    pub fn pointer_move(&self, event: PointerEvent) {
        let bounds = self.track.bounds();

        let position = {
            let mut state = self.state.lock();
            let duration = state.playback.duration();

            state.scrub.pointer_move(event, bounds, duration)
        };

        if let Some(position) = position {
            self.apply_scrub(ScrubAction::Seek(position));
        }
    }

    pub async fn pointer_up(&self, event: PointerEvent) {
        let actions = self.state.lock().scrub.pointer_up(event);
        self.finish_scrub(actions).await;
    }

    pub async fn pointer_cancel(&self, event: PointerEvent) {
        let actions = self.state.lock().scrub.pointer_cancel(event);
        self.finish_scrub(actions).await;
    }

    /// Shows new search results. They become the queue once a track is picked from them.
    pub fn set_search_results(&self, tracks: Vec<TrackDescriptor>) {
        self.state.lock().queue.set_queue(tracks, QueueMode::Search);
    }

    /// Adds or removes a favorite and saves the list.
    /// Returns true if the track is a favorite afterwards.
    pub async fn toggle_favorite(&self, track: &TrackDescriptor) -> Result<bool, PlayerError> {
        let (favorite, json) = {
            let mut state = self.state.lock();
            let favorite = state.favorites.toggle(track);

            (favorite, Self::sync_favorites(&mut state)?)
        };

        self.slot.write(&json).await?;
        Ok(favorite)
    }

    /// Removes a favorite and saves the list. Returns false if it wasn't a favorite.
    pub async fn remove_favorite(&self, id: &str) -> Result<bool, PlayerError> {
        let json = {
            let mut state = self.state.lock();

            if !state.favorites.remove(id) {
                return Ok(false);
            }

            Self::sync_favorites(&mut state)?
        };

        self.slot.write(&json).await?;
        Ok(true)
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        let state = self.state.lock();
        let playback = &state.playback;
        let current = playback.current().cloned();

        PlayerSnapshot {
            state: playback.state(),
            status: playback.status().to_string(),
            position: playback.position(),
            duration: playback.duration(),
            progress_percent: playback.progress_percent(),
            elapsed: format_time(playback.position()),
            total: format_time(playback.duration().unwrap_or(0.)),
            volume: playback.volume_state(),
            silent: playback.is_silent(),
            dragging: state.scrub.is_dragging(),
            queue_mode: state.queue.mode(),
            queue_index: state.queue.current_index(),
            has_next: state.queue.has_next(),
            has_previous: state.queue.has_previous(),
            current_is_favorite: current
                .as_ref()
                .is_some_and(|t| state.favorites.contains(&t.id)),
            favorites: state.favorites.tracks().to_vec(),
            current,
        }
    }

    async fn load_selected(
        &self,
        track: Option<TrackDescriptor>,
    ) -> Result<LoadOutcome, PlayerError> {
        match track {
            Some(track) => self.load(track).await,
            None => Ok(LoadOutcome::Unchanged),
        }
    }

    async fn load(&self, track: TrackDescriptor) -> Result<LoadOutcome, PlayerError> {
        debug!("Loading {} ({})", track.title, track.id);

        let selection = self.state.lock().playback.select(track.clone());
        self.media.clear_source();

        match self.start(selection, track).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                let failed = self.state.lock().playback.load_failed(selection, &e);

                if !failed {
                    return Ok(LoadOutcome::Superseded);
                }

                self.media.clear_source();
                Err(e)
            }
        }
    }

    async fn start(
        &self,
        selection: SelectionId,
        track: TrackDescriptor,
    ) -> Result<LoadOutcome, PlayerError> {
        let media_id = match &track.media_id {
            Some(media_id) => media_id.clone(),
            None => {
                let query = track
                    .search_query()
                    .ok_or_else(|| PlayerError::NoQuery(track.id.clone()))?;

                let media_id = self.source.media_id(&query).await?;
                let resolved = track.with_media_id(media_id.clone());

                let mut state = self.state.lock();

                if !state.playback.is_current(selection) {
                    return Ok(LoadOutcome::Superseded);
                }

                state.queue.replace_entry(&resolved);
                state.playback.replace_current(resolved);

                media_id
            }
        };

        self.media.set_source(&self.source.stream_url(&media_id));
        let played = self.media.play().await;

        let mut state = self.state.lock();

        if !state.playback.is_current(selection) {
            return Ok(LoadOutcome::Superseded);
        }

        played?;
        state.playback.play_started(selection);

        Ok(LoadOutcome::Started)
    }

    /// Starts the media element after a toggle or a drag, pausing again if it refuses.
    async fn resume_media(&self) {
        if let Err(e) = self.media.play().await {
            warn!("Could not resume playback: {}", e);

            self.state.lock().playback.pause();
            self.media.pause();
        }
    }

    async fn finish_scrub(&self, actions: Vec<ScrubAction>) {
        for action in actions {
            match action {
                ScrubAction::Resume => {
                    let resumed = self.state.lock().playback.resume();

                    if resumed {
                        self.resume_media().await;
                    }
                }
                action => self.apply_scrub(action),
            }
        }
    }

    fn apply_scrub(&self, action: ScrubAction) {
        match action {
            ScrubAction::CapturePointer(id) => self.track.capture_pointer(id),
            ScrubAction::ReleasePointer(id) => self.track.release_pointer(id),
            ScrubAction::Pause => {
                if self.state.lock().playback.pause() {
                    self.media.pause();
                }
            }
            ScrubAction::Seek(position) => {
                self.state.lock().playback.preview_position(position);
                self.media.seek(position);
            }
            // Resuming awaits the media element, see finish_scrub.
            ScrubAction::Resume => {}
        }
    }

    fn apply_volume(&self, volume: VolumeState) {
        self.media.set_volume(volume.volume);
        self.media.set_muted(volume.muted);
    }

    /// Keeps a favorites queue in step with the list and encodes the list for saving.
    fn sync_favorites(state: &mut PlayerState) -> Result<String, PlayerError> {
        let tracks = state.favorites.tracks().to_vec();
        state.queue.sync_list(tracks, QueueMode::Favorites);

        Ok(state.favorites.to_json()?)
    }
}
