use crate::constants::OPEN_FOOD_FACTS_API;
use crate::error::{LookupError, Result};
use crate::normalize;
use crate::types::{ProductRecord, ProductSource, SourceTag};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, instrument};

/// Open Food Facts, the free community catalog. No credential required, so
/// this source is always in the chain.
pub struct OpenFoodFactsSource {
    client: reqwest::Client,
    base_url: String,
}

impl Default for OpenFoodFactsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenFoodFactsSource {
    pub fn new() -> Self {
        Self::with_base_url(OPEN_FOOD_FACTS_API.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }
}

#[async_trait::async_trait]
impl ProductSource for OpenFoodFactsSource {
    fn source_tag(&self) -> SourceTag {
        SourceTag::OpenFoodFacts
    }

    #[instrument(skip(self))]
    async fn fetch(&self, barcode: &str) -> Result<Option<ProductRecord>> {
        let url = format!("{}/product/{}.json", self.base_url, barcode);
        let response = self.client.get(&url).send().await?;

        // Unknown barcodes come back as 404 with a failure body
        if response.status() == StatusCode::NOT_FOUND {
            debug!("Open Food Facts has no product for {}", barcode);
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(LookupError::Source {
                message: format!(
                    "Open Food Facts returned status {}",
                    response.status().as_u16()
                ),
            });
        }

        let body: Value = response.json().await?;
        Ok(normalize::from_open_food_facts(barcode, &body))
    }
}
