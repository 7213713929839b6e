use bytes::Bytes;
use reqwest::{header::CONTENT_TYPE, Client, Url};

use crate::CatalogError;

/// Cover art fetched on behalf of the client
#[derive(Debug, Clone)]
pub struct Cover {
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Fetches an image over http(s). Other schemes are rejected.
pub async fn fetch_cover(client: &Client, url: &str) -> Result<Cover, CatalogError> {
    let url = Url::parse(url).map_err(|e| CatalogError::InvalidUrl(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(CatalogError::InvalidUrl(url.to_string()));
    }

    let response = client.get(url).send().await?.error_for_status()?;

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let bytes = response.bytes().await?;

    Ok(Cover {
        content_type,
        bytes,
    })
}
