use std::fmt::Display;

use earworm_core::{Id, TrackDescriptor};
use log::warn;

/// Shown while a track is being resolved and buffered.
pub const LOADING_MESSAGE: &str = "Loading…";

/// Shown when a track could not be played.
pub const PLAYBACK_FAILED_MESSAGE: &str = "Unable to play this track";

/// The volume restored by unmuting when no audible volume was ever set.
pub const DEFAULT_RESTORE_VOLUME: f64 = 0.7;

/// Marker for [SelectionId].
pub struct Selection;

/// Identifies one selection of a track, so late completions of an older load can be told apart.
pub type SelectionId = Id<Selection>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    /// Nothing has been selected yet.
    #[default]
    Idle,
    /// A track was selected and is being resolved or buffered.
    Loading,
    Playing,
    Paused,
    /// The track played to its end.
    Ended,
    /// The selected track could not be played.
    Error,
}

/// What the media element has to do after a transport toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportCommand {
    Play,
    Pause,
    /// Seek to the start, then play.
    Restart,
}

/// The volume that should be applied to the media element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeState {
    pub volume: f64,
    pub muted: bool,
}

/// The state machine behind a single media element.
///
/// Holds the transport state, volume and progress of the current playback session.
/// It never performs I/O, callers apply the returned commands to the media element.
pub struct PlaybackController {
    state: TransportState,
    current: Option<TrackDescriptor>,
    selection: Option<SelectionId>,
    volume: f64,
    muted: bool,
    /// The last audible volume, restored when unmuting
    last_volume: f64,
    position: f64,
    duration: Option<f64>,
    status: String,
}

impl PlaybackController {
    pub fn new(volume: f64) -> Self {
        let volume = clamp_volume(volume);

        Self {
            state: TransportState::Idle,
            current: None,
            selection: None,
            volume,
            muted: volume == 0.,
            last_volume: if volume > 0. {
                volume
            } else {
                DEFAULT_RESTORE_VOLUME
            },
            position: 0.,
            duration: None,
            status: String::new(),
        }
    }

    /// Starts loading a track, from any state.
    ///
    /// The track is shown right away, before it is known to be playable.
    pub fn select(&mut self, track: TrackDescriptor) -> SelectionId {
        let selection = SelectionId::new();

        self.state = TransportState::Loading;
        self.current = Some(track);
        self.selection = Some(selection);
        self.status = LOADING_MESSAGE.to_string();
        self.position = 0.;
        self.duration = None;

        selection
    }

    /// Returns true if the selection is the most recent one.
    pub fn is_current(&self, selection: SelectionId) -> bool {
        self.selection == Some(selection)
    }

    /// Marks the selection as playing.
    /// Returns false if the selection is stale or no longer loading.
    pub fn play_started(&mut self, selection: SelectionId) -> bool {
        if !self.is_current(selection) || self.state != TransportState::Loading {
            return false;
        }

        self.state = TransportState::Playing;
        self.status.clear();

        true
    }

    /// Marks the selection as failed. The queue position is left alone.
    /// Returns false if the selection is stale.
    pub fn load_failed<E>(&mut self, selection: SelectionId, error: E) -> bool
    where
        E: Display,
    {
        if !self.is_current(selection) || self.state != TransportState::Loading {
            return false;
        }

        warn!("Failed to play {}: {}", self.describe_current(), error);

        self.state = TransportState::Error;
        self.status = PLAYBACK_FAILED_MESSAGE.to_string();

        true
    }

    /// Replaces the current descriptor with a newer version of the same track.
    pub fn replace_current(&mut self, track: TrackDescriptor) -> bool {
        match &self.current {
            Some(current) if current.id == track.id => {
                self.current = Some(track);
                true
            }
            _ => false,
        }
    }

    /// Flips between playing and paused. An ended track is restarted.
    /// Returns `None` if there is nothing loaded to toggle.
    pub fn toggle(&mut self) -> Option<TransportCommand> {
        match self.state {
            TransportState::Playing => {
                self.state = TransportState::Paused;
                Some(TransportCommand::Pause)
            }
            TransportState::Paused => {
                self.state = TransportState::Playing;
                Some(TransportCommand::Play)
            }
            TransportState::Ended => {
                self.state = TransportState::Playing;
                self.position = 0.;
                Some(TransportCommand::Restart)
            }
            _ => None,
        }
    }

    /// Pauses a playing track. Returns false if it wasn't playing.
    pub fn pause(&mut self) -> bool {
        if self.state != TransportState::Playing {
            return false;
        }

        self.state = TransportState::Paused;
        true
    }

    /// Resumes a paused track. Returns false if it wasn't paused.
    pub fn resume(&mut self) -> bool {
        if self.state != TransportState::Paused {
            return false;
        }

        self.state = TransportState::Playing;
        true
    }

    /// Handles the media element reaching the end of the track.
    pub fn on_ended(&mut self) -> bool {
        if !matches!(self.state, TransportState::Playing | TransportState::Paused) {
            return false;
        }

        self.state = TransportState::Ended;
        self.position = 0.;

        true
    }

    /// Handles an error from the media element that left it without a usable source.
    /// Errors while loading are reported by the load itself.
    pub fn media_error(&mut self) -> bool {
        if self.current.is_none() || self.state == TransportState::Loading {
            return false;
        }

        warn!("Media element failed while playing {}", self.describe_current());

        self.state = TransportState::Error;
        self.status = PLAYBACK_FAILED_MESSAGE.to_string();

        true
    }

    /// Mutes, or unmutes back to the last audible volume.
    pub fn toggle_mute(&mut self) -> VolumeState {
        if !self.muted && self.volume > 0. {
            self.last_volume = self.volume;
            self.muted = true;
            self.volume = 0.;
        } else {
            self.muted = false;
            self.volume = if self.last_volume > 0. {
                self.last_volume
            } else {
                DEFAULT_RESTORE_VOLUME
            };
        }

        self.volume_state()
    }

    /// Sets the volume from a slider. Zero mutes, anything else unmutes.
    pub fn set_volume(&mut self, volume: f64) -> VolumeState {
        let volume = clamp_volume(volume);

        self.volume = volume;
        self.muted = volume == 0.;

        if volume > 0. {
            self.last_volume = volume;
        }

        self.volume_state()
    }

    pub fn volume_state(&self) -> VolumeState {
        VolumeState {
            volume: self.volume,
            muted: self.muted,
        }
    }

    /// Returns true if nothing can be heard, which is what the mute glyph shows.
    pub fn is_silent(&self) -> bool {
        self.muted || self.volume == 0.
    }

    pub fn last_volume(&self) -> f64 {
        self.last_volume
    }

    /// Updates progress from the media element.
    /// Not called while the progress bar is being dragged.
    pub fn sync_progress(&mut self, position: f64, duration: Option<f64>) {
        self.position = sanitize_position(position);
        self.sync_duration(duration);
    }

    pub fn sync_duration(&mut self, duration: Option<f64>) {
        self.duration = duration.filter(|d| d.is_finite() && *d > 0.);
    }

    /// Shows a position chosen by dragging, before the media element reports it.
    pub fn preview_position(&mut self, position: f64) {
        self.position = sanitize_position(position);

        // Seeking away from the end makes the track resumable again.
        if self.state == TransportState::Ended {
            self.state = TransportState::Paused;
        }
    }

    /// Returns the progress as a percentage between 0 and 100.
    pub fn progress_percent(&self) -> f64 {
        match self.duration {
            Some(duration) => (self.position / duration * 100.).clamp(0., 100.),
            None => 0.,
        }
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }

    /// Returns true if the media element has a playable source.
    pub fn is_loaded(&self) -> bool {
        matches!(
            self.state,
            TransportState::Playing | TransportState::Paused | TransportState::Ended
        )
    }

    pub fn current(&self) -> Option<&TrackDescriptor> {
        self.current.as_ref()
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    fn describe_current(&self) -> String {
        self.current
            .as_ref()
            .map(|t| format!("{} ({})", t.title, t.id))
            .unwrap_or_else(|| "nothing".to_string())
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new(DEFAULT_RESTORE_VOLUME)
    }
}

fn clamp_volume(volume: f64) -> f64 {
    if volume.is_nan() {
        0.
    } else {
        volume.clamp(0., 1.)
    }
}

fn sanitize_position(position: f64) -> f64 {
    if position.is_finite() {
        position.max(0.)
    } else {
        0.
    }
}
