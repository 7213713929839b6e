use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::{de::DeserializeOwned, Deserialize};
use utoipa::IntoParams;
use validator::{Validate, ValidationError};

use crate::errors::ServerError;

#[derive(Debug, Validate, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Free text search
    #[validate(length(min = 1, max = 256))]
    pub q: String,
}

#[derive(Debug, Validate, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StreamQuery {
    /// The media identifier to stream
    #[validate(custom(function = "validate_media_id"))]
    pub id: String,
}

#[derive(Debug, Validate, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CoverQuery {
    /// The image to fetch
    #[validate(length(min = 1, max = 2048))]
    pub url: String,
}

#[derive(Debug, Validate, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LyricsQuery {
    #[validate(length(min = 1, max = 256))]
    pub artist: String,
    #[validate(length(min = 1, max = 256))]
    pub title: String,
}

/// Media identifiers end up inside the watch URL, so only URL-safe characters pass.
fn validate_media_id(id: &str) -> Result<(), ValidationError> {
    let valid = !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("media_id"))
    }
}

/// Query string extractor that rejects requests failing validation.
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|_| ServerError::InvalidQuery)?;

        query.validate().map_err(|_| ServerError::InvalidQuery)?;

        Ok(Self(query))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_media_id_validation() {
        assert!(validate_media_id("dQw4w9WgXcQ").is_ok());
        assert!(validate_media_id("a-b_c").is_ok());
        assert!(validate_media_id("").is_err());
        assert!(validate_media_id("abc&list=x").is_err());
        assert!(validate_media_id("../etc").is_err());
    }
}
