use crate::error::Result;
use crate::storage::ProductStore;
use crate::types::{ProductRecord, ProductSource, SourceTag};
use std::sync::Arc;
use tracing::instrument;

/// First stop in the waterfall: the persistence store itself. A hit returns
/// the stored record with its original provenance intact, so a record
/// resolved from the web last week still says so.
pub struct CacheSource {
    store: Arc<dyn ProductStore>,
}

impl CacheSource {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl ProductSource for CacheSource {
    fn source_tag(&self) -> SourceTag {
        SourceTag::Cache
    }

    #[instrument(skip(self))]
    async fn fetch(&self, barcode: &str) -> Result<Option<ProductRecord>> {
        self.store.get_by_barcode(barcode).await
    }
}
