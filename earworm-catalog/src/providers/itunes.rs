use async_trait::async_trait;
use earworm_core::TrackDescriptor;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::SearchProvider;
use crate::CatalogError;

const ITUNES_SEARCH_URL: &str = "https://itunes.apple.com/search";

#[derive(Debug, Deserialize)]
struct ItunesResponse {
    #[serde(default)]
    results: Vec<Value>,
}

/// Song search through the iTunes Search API.
pub struct ItunesSearch {
    client: Client,
    url: String,
}

impl ItunesSearch {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            url: ITUNES_SEARCH_URL.to_string(),
        }
    }
}

#[async_trait]
impl SearchProvider for ItunesSearch {
    fn name(&self) -> &'static str {
        "iTunes"
    }

    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<TrackDescriptor>, CatalogError> {
        let limit = limit.to_string();

        let body = self
            .client
            .get(&self.url)
            .query(&[
                ("term", query),
                ("media", "music"),
                ("entity", "song"),
                ("limit", &limit),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_results(&body)
    }
}

/// Parses a search response, skipping results that are not tracks.
fn parse_results(body: &str) -> Result<Vec<TrackDescriptor>, CatalogError> {
    let response: ItunesResponse =
        serde_json::from_str(body).map_err(|e| CatalogError::Parse(e.to_string()))?;

    let total = response.results.len();
    let tracks: Vec<_> = response
        .results
        .into_iter()
        .filter_map(|v| serde_json::from_value::<TrackDescriptor>(v).ok())
        .collect();

    if tracks.len() < total {
        debug!("Skipped {} iTunes results without track info", total - tracks.len());
    }

    Ok(tracks)
}
