use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use earworm_core::TrackDescriptor;
use log::{debug, warn};
use parking_lot::Mutex;
use thiserror::Error;

/// The slot favorites are persisted in.
pub const FAVORITES_SLOT: &str = "music-favorites";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A single named value in client-local storage
#[async_trait]
pub trait StorageSlot
where
    Self: 'static + Send + Sync,
{
    /// Reads the stored value, if anything was stored yet.
    async fn read(&self) -> Result<Option<String>, StorageError>;
    async fn write(&self, value: &str) -> Result<(), StorageError>;
}

pub type BoxedStorageSlot = Arc<dyn StorageSlot>;

/// Keeps the value in memory only
#[derive(Debug, Default)]
pub struct MemorySlot {
    value: Mutex<Option<String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value<S: Into<String>>(value: S) -> Self {
        Self {
            value: Mutex::new(Some(value.into())),
        }
    }

    pub fn value(&self) -> Option<String> {
        self.value.lock().clone()
    }
}

#[async_trait]
impl StorageSlot for MemorySlot {
    async fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self.value())
    }

    async fn write(&self, value: &str) -> Result<(), StorageError> {
        *self.value.lock() = Some(value.to_string());
        Ok(())
    }
}

/// Stores the value in `<dir>/<name>.json`
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(dir: &Path, name: &str) -> Self {
        Self {
            path: dir.join(format!("{name}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StorageSlot for FileSlot {
    async fn read(&self) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, value: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, value).await?;
        Ok(())
    }
}

/// The tracks the user marked as favorite, in the order they were added.
///
/// The whole list is rewritten on every change, so the last writer wins.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Favorites {
    tracks: Vec<TrackDescriptor>,
}

impl Favorites {
    /// Reads the favorites from a slot.
    /// Unreadable or malformed contents are treated as no favorites.
    pub async fn load(slot: &dyn StorageSlot) -> Self {
        match slot.read().await {
            Ok(value) => Self::parse(value.as_deref()),
            Err(e) => {
                warn!("Could not read favorites: {}", e);
                Self::default()
            }
        }
    }

    pub fn parse(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::default();
        };

        match serde_json::from_str::<Vec<TrackDescriptor>>(value) {
            Ok(tracks) => {
                debug!("Loaded {} favorites", tracks.len());
                Self { tracks }
            }
            Err(e) => {
                warn!("Ignoring stored favorites: {}", e);
                Self::default()
            }
        }
    }

    /// Adds the track, or removes it if it already is a favorite.
    /// Returns true if the track is a favorite afterwards.
    pub fn toggle(&mut self, track: &TrackDescriptor) -> bool {
        if self.remove(&track.id) {
            return false;
        }

        self.tracks.push(track.clone());
        true
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.tracks.len();
        self.tracks.retain(|t| t.id != id);

        self.tracks.len() != before
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tracks.iter().any(|t| t.id == id)
    }

    pub fn tracks(&self) -> &[TrackDescriptor] {
        &self.tracks
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.tracks)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn track(id: &str) -> TrackDescriptor {
        TrackDescriptor::new(id, format!("Song {id}"), "Artist")
    }

    #[tokio::test]
    async fn test_load_treats_bad_contents_as_empty() {
        for stored in ["not json", r#"{"trackId":"1"}"#, "42"] {
            let slot = MemorySlot::with_value(stored);
            assert!(Favorites::load(&slot).await.tracks().is_empty(), "{stored}");
        }

        assert!(Favorites::load(&MemorySlot::new()).await.tracks().is_empty());
    }

    #[test]
    fn test_toggle_and_remove() {
        let mut favorites = Favorites::default();

        assert!(favorites.toggle(&track("a")));
        assert!(favorites.toggle(&track("b")));
        assert!(favorites.contains("a"));

        assert!(!favorites.toggle(&track("a")));
        assert!(!favorites.contains("a"));

        assert!(favorites.remove("b"));
        assert!(!favorites.remove("b"));
        assert!(favorites.tracks().is_empty());
    }

    #[tokio::test]
    async fn test_survives_reload() {
        let slot = MemorySlot::new();
        let mut favorites = Favorites::default();
        favorites.toggle(&track("a"));
        favorites.toggle(&track("b").with_media_id("vid"));

        slot.write(&favorites.to_json().expect("serializes"))
            .await
            .expect("writes");

        let reloaded = Favorites::load(&slot).await;
        assert_eq!(reloaded, favorites);
        assert_eq!(reloaded.tracks()[1].media_id.as_deref(), Some("vid"));
    }

    #[tokio::test]
    async fn test_file_slot() {
        let dir = std::env::temp_dir().join(format!("earworm-slot-{}", std::process::id()));
        let slot = FileSlot::new(&dir, FAVORITES_SLOT);

        tokio::fs::remove_file(slot.path()).await.ok();
        assert!(slot.read().await.expect("reads").is_none());

        slot.write("[]").await.expect("writes");
        assert_eq!(slot.read().await.expect("reads").as_deref(), Some("[]"));
        assert!(slot.path().ends_with("music-favorites.json"));

        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
