/// The kind of device behind a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
    Pen,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pointer_id: i32,
    pub kind: PointerKind,
    /// The pressed button, `0` being the primary one
    pub button: i16,
    /// Horizontal position in the same coordinate space as [TrackBounds]
    pub x: f64,
}

impl PointerEvent {
    pub fn new(pointer_id: i32, kind: PointerKind, button: i16, x: f64) -> Self {
        Self {
            pointer_id,
            kind,
            button,
            x,
        }
    }

    /// A primary mouse button event.
    pub fn mouse(x: f64) -> Self {
        Self::new(1, PointerKind::Mouse, 0, x)
    }
}

/// The horizontal extent of the progress track
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TrackBounds {
    pub left: f64,
    pub width: f64,
}

/// The playback facts a drag depends on, taken when the pointer goes down
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ScrubGate {
    /// Whether the media element has a source
    pub loaded: bool,
    pub playing: bool,
    pub duration: Option<f64>,
}

/// Side effects requested by the scrub controller, in order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrubAction {
    CapturePointer(i32),
    Pause,
    Seek(f64),
    ReleasePointer(i32),
    Resume,
}

/// Turns drags on the progress track into seeks.
///
/// While a drag is in flight, progress updates from the media element must be ignored.
#[derive(Debug, Default)]
pub struct ScrubController {
    dragging: bool,
    was_playing: bool,
    pointer_id: Option<i32>,
}

impl ScrubController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a drag, returning nothing if the drag can't start.
    pub fn pointer_down(
        &mut self,
        event: PointerEvent,
        bounds: TrackBounds,
        gate: ScrubGate,
    ) -> Vec<ScrubAction> {
        if event.kind == PointerKind::Mouse && event.button != 0 {
            return vec![];
        }

        if !gate.loaded {
            return vec![];
        }

        let Some(position) = seek_position(event.x, bounds, gate.duration) else {
            return vec![];
        };

        self.dragging = true;
        self.was_playing = gate.playing;
        self.pointer_id = Some(event.pointer_id);

        vec![
            ScrubAction::CapturePointer(event.pointer_id),
            ScrubAction::Pause,
            ScrubAction::Seek(position),
        ]
    }

    /// Returns the position to seek to while dragging.
    pub fn pointer_move(
        &mut self,
        event: PointerEvent,
        bounds: TrackBounds,
        duration: Option<f64>,
    ) -> Option<f64> {
        if !self.dragging {
            return None;
        }

        seek_position(event.x, bounds, duration)
    }

    /// Ends the drag. Playback resumes only if it was active when the drag started.
    pub fn pointer_up(&mut self, event: PointerEvent) -> Vec<ScrubAction> {
        if !self.dragging {
            return vec![];
        }

        self.dragging = false;

        let pointer_id = self.pointer_id.take().unwrap_or(event.pointer_id);
        let mut actions = vec![ScrubAction::ReleasePointer(pointer_id)];

        if std::mem::take(&mut self.was_playing) {
            actions.push(ScrubAction::Resume);
        }

        actions
    }

    pub fn pointer_cancel(&mut self, event: PointerEvent) -> Vec<ScrubAction> {
        self.pointer_up(event)
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }
}

/// Maps a horizontal position on the track to a time in the track.
/// Returns `None` if the duration is unknown or the track has no width.
pub fn seek_position(x: f64, bounds: TrackBounds, duration: Option<f64>) -> Option<f64> {
    let duration = duration.filter(|d| d.is_finite() && *d > 0.)?;

    if !(bounds.width.is_finite() && bounds.width > 0.) || !x.is_finite() {
        return None;
    }

    let fraction = ((x - bounds.left) / bounds.width).clamp(0., 1.);
    Some(duration * fraction)
}
