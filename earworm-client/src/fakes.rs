//! Test doubles for the player's collaborators.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::{MediaElement, MediaError, ProgressTrack, SourceError, StreamSource, TrackBounds};

#[derive(Debug, Clone, PartialEq)]
pub enum MediaCall {
    ClearSource,
    SetSource(String),
    Play,
    Pause,
    Seek(f64),
    SetVolume(f64),
    SetMuted(bool),
}

/// Records what was asked of it. Playback can be made to fail.
#[derive(Debug, Default)]
pub struct FakeMedia {
    calls: Mutex<Vec<MediaCall>>,
    play_error: Mutex<Option<MediaError>>,
}

impl FakeMedia {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_play(&self, message: &str) {
        *self.play_error.lock() = Some(MediaError(message.to_string()));
    }

    pub fn calls(&self) -> Vec<MediaCall> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// The last source that was set and not cleared afterwards.
    pub fn source(&self) -> Option<String> {
        let calls = self.calls.lock();

        calls.iter().rev().find_map(|c| match c {
            MediaCall::SetSource(url) => Some(Some(url.clone())),
            MediaCall::ClearSource => Some(None),
            _ => None,
        })?
    }

    fn record(&self, call: MediaCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl MediaElement for FakeMedia {
    fn clear_source(&self) {
        self.record(MediaCall::ClearSource);
    }

    fn set_source(&self, url: &str) {
        self.record(MediaCall::SetSource(url.to_string()));
    }

    async fn play(&self) -> Result<(), MediaError> {
        self.record(MediaCall::Play);

        match self.play_error.lock().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn pause(&self) {
        self.record(MediaCall::Pause);
    }

    fn seek(&self, position: f64) {
        self.record(MediaCall::Seek(position));
    }

    fn set_volume(&self, volume: f64) {
        self.record(MediaCall::SetVolume(volume));
    }

    fn set_muted(&self, muted: bool) {
        self.record(MediaCall::SetMuted(muted));
    }
}

/// Answers lookups from a fixed table. Lookups for a query can be held until released.
#[derive(Debug, Default)]
pub struct FakeSource {
    ids: Mutex<HashMap<String, String>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    lookups: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_id(&self, query: &str, media_id: &str) {
        self.ids
            .lock()
            .insert(query.to_string(), media_id.to_string());
    }

    /// Holds lookups for `query` until the returned gate is notified.
    pub fn gate(&self, query: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().insert(query.to_string(), gate.clone());

        gate
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamSource for FakeSource {
    async fn media_id(&self, query: &str) -> Result<String, SourceError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        let gate = self.gates.lock().get(query).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.ids.lock().get(query).cloned().ok_or(SourceError::NotFound)
    }

    fn stream_url(&self, media_id: &str) -> String {
        format!("stream://{media_id}")
    }
}

/// A progress bar spanning `0..100`
#[derive(Debug, Default)]
pub struct FakeTrack {
    pub captured: Mutex<Vec<i32>>,
    pub released: Mutex<Vec<i32>>,
}

impl FakeTrack {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl ProgressTrack for FakeTrack {
    fn bounds(&self) -> TrackBounds {
        TrackBounds {
            left: 0.,
            width: 100.,
        }
    }

    fn capture_pointer(&self, pointer_id: i32) {
        self.captured.lock().push(pointer_id);
    }

    fn release_pointer(&self, pointer_id: i32) {
        self.released.lock().push(pointer_id);
    }
}
