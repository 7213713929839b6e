use serde::{Deserialize, Deserializer, Serialize};

/// A track as presented by a search provider or the favorites list.
///
/// Descriptors are never mutated in place. Resolving the media identifier later
/// produces a new descriptor which replaces the old one wherever it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    /// Provider-scoped identifier, unique within a result set
    #[serde(rename = "trackId", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "trackName", default)]
    pub title: String,
    #[serde(rename = "artistName", default)]
    pub artist: String,
    #[serde(
        rename = "artworkUrl100",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub artwork: Option<String>,
    #[serde(
        rename = "artworkUrl60",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub artwork_small: Option<String>,
    #[serde(
        rename = "collectionName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub collection: Option<String>,
    #[serde(
        rename = "trackTimeMillis",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_ms: Option<u64>,
    /// Identifier understood by the resolution tool, if known yet
    #[serde(rename = "videoId", default, skip_serializing_if = "Option::is_none")]
    pub media_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl TrackDescriptor {
    pub fn new<I, T, A>(id: I, title: T, artist: A) -> Self
    where
        I: Into<String>,
        T: Into<String>,
        A: Into<String>,
    {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            artwork: None,
            artwork_small: None,
            collection: None,
            duration_ms: None,
            media_id: None,
            source: None,
        }
    }

    /// Returns a copy of this descriptor with the media identifier filled in.
    pub fn with_media_id<S>(&self, media_id: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            media_id: Some(media_id.into()),
            ..self.clone()
        }
    }

    /// The best available artwork, preferring the large variant
    pub fn artwork_url(&self) -> Option<&str> {
        self.artwork
            .as_deref()
            .or(self.artwork_small.as_deref())
            .filter(|url| !url.is_empty())
    }

    /// The duration hint in seconds, if the provider supplied one
    pub fn duration_secs(&self) -> Option<f64> {
        self.duration_ms.map(|ms| ms as f64 / 1000.)
    }

    /// Builds the free-text query used to look up a media identifier for this track.
    ///
    /// Returns [None] when the descriptor has nothing to search for.
    pub fn search_query(&self) -> Option<String> {
        let mut parts: Vec<&str> = [self.title.as_str(), self.artist.as_str()]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect();

        if parts.is_empty() {
            if let Some(collection) = self.collection.as_deref().filter(|c| !c.is_empty()) {
                parts.push(collection);
            }
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" - "))
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

// iTunes identifiers are numeric, favorites stored by older clients may still carry them.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}
