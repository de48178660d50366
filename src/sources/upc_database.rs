use crate::error::{LookupError, Result};
use crate::normalize;
use crate::types::{ProductRecord, ProductSource, SourceTag};
use serde_json::Value;
use tracing::instrument;

/// Keyed UPC database lookup (SearchUPC-style API). Only constructed when
/// an API key is configured.
pub struct UpcDatabaseSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl UpcDatabaseSource {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }
}

#[async_trait::async_trait]
impl ProductSource for UpcDatabaseSource {
    fn source_tag(&self) -> SourceTag {
        SourceTag::UpcDatabase
    }

    #[instrument(skip(self))]
    async fn fetch(&self, barcode: &str) -> Result<Option<ProductRecord>> {
        let url = format!("{}/lookup", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("upc", barcode), ("apikey", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LookupError::Source {
                message: format!(
                    "UPC database returned status {}",
                    response.status().as_u16()
                ),
            });
        }

        // A well-formed response with success=false is a miss, not an error
        let body: Value = response.json().await?;
        Ok(normalize::from_upc_database(barcode, &body))
    }
}
