use std::sync::Arc;

use earworm_catalog::Catalog;
use earworm_core::RangeProxy;

#[derive(Clone)]
pub struct ServerContext {
    pub proxy: Arc<RangeProxy>,
    pub catalog: Arc<Catalog>,
}

impl ServerContext {
    pub fn new(proxy: RangeProxy, catalog: Catalog) -> Self {
        Self {
            proxy: Arc::new(proxy),
            catalog: Arc::new(catalog),
        }
    }
}
