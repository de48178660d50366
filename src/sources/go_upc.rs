use crate::error::{LookupError, Result};
use crate::normalize;
use crate::types::{ProductRecord, ProductSource, SourceTag};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, instrument};

/// Go-UPC lookup. Paid per call, so it sits low in the waterfall and is
/// only constructed when an API key is configured.
pub struct GoUpcSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GoUpcSource {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }
}

#[async_trait::async_trait]
impl ProductSource for GoUpcSource {
    fn source_tag(&self) -> SourceTag {
        SourceTag::GoUpc
    }

    #[instrument(skip(self))]
    async fn fetch(&self, barcode: &str) -> Result<Option<ProductRecord>> {
        let url = format!("{}/code/{}", self.base_url, barcode);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("Go-UPC has no product for {}", barcode);
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(LookupError::Source {
                message: format!("Go-UPC returned status {}", response.status().as_u16()),
            });
        }

        let body: Value = response.json().await?;
        Ok(normalize::from_go_upc(barcode, &body))
    }
}
