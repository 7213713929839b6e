use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use earworm_catalog::CatalogError;
use earworm_core::{ProxyError, ResolveError};
use log::warn;
use thiserror::Error;

use crate::serialized::ErrorBody;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Missing or invalid query parameters")]
    InvalidQuery,
    #[error("Unavailable")]
    Unavailable,
    #[error("No results")]
    NoResults,
    #[error("Stream failed: {0}")]
    Resolution(ResolveError),
    #[error("Stream failed: {0}")]
    Upstream(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("Unknown internal error: {0}")]
    Unknown(String),
}

impl ServerError {
    fn as_status_code(&self) -> StatusCode {
        match self {
            Self::InvalidQuery | Self::Unavailable => StatusCode::BAD_REQUEST,
            Self::Catalog(CatalogError::InvalidUrl(_)) => StatusCode::BAD_REQUEST,
            Self::NoResults => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.as_status_code();

        if status.is_server_error() {
            warn!("Request failed with {}: {}", status, self);
        }

        let body = ErrorBody {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ProxyError> for ServerError {
    fn from(value: ProxyError) -> Self {
        match value {
            ProxyError::Resolution(ResolveError::Unavailable) => Self::Unavailable,
            ProxyError::Resolution(e) => Self::Resolution(e),
            e => Self::Upstream(e.to_string()),
        }
    }
}
