mod itunes;
mod youtube;

use std::sync::Arc;

use async_trait::async_trait;
use earworm_core::TrackDescriptor;

pub use itunes::*;
pub use youtube::*;

use crate::CatalogError;

/// Represents a service that can be searched for tracks
#[async_trait]
pub trait SearchProvider
where
    Self: 'static + Send + Sync,
{
    /// Returns the name used when logging failures
    fn name(&self) -> &'static str;

    /// Returns at most `limit` tracks matching the query.
    async fn search(&self, query: &str, limit: usize)
        -> Result<Vec<TrackDescriptor>, CatalogError>;
}

/// [SearchProvider] trait object.
pub type BoxedSearchProvider = Arc<dyn SearchProvider>;
