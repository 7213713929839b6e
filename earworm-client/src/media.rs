use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::TrackBounds;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Media element error: {0}")]
pub struct MediaError(pub String);

/// The audio element playback is driven through.
///
/// Only [MediaElement::play] is asynchronous, since starting playback can be refused
/// or fail once the source is fetched.
#[async_trait]
pub trait MediaElement
where
    Self: 'static + Send + Sync,
{
    /// Stops fetching and unloads the current source.
    fn clear_source(&self);
    fn set_source(&self, url: &str);
    async fn play(&self) -> Result<(), MediaError>;
    fn pause(&self);
    fn seek(&self, position: f64);
    fn set_volume(&self, volume: f64);
    fn set_muted(&self, muted: bool);
}

/// The progress bar the user scrubs on
pub trait ProgressTrack
where
    Self: 'static + Send + Sync,
{
    fn bounds(&self) -> TrackBounds;
    fn capture_pointer(&self, pointer_id: i32);
    fn release_pointer(&self, pointer_id: i32);
}

pub type BoxedMediaElement = Arc<dyn MediaElement>;
pub type BoxedProgressTrack = Arc<dyn ProgressTrack>;
