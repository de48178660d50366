use crate::classifier;
use crate::config::WebSearchConfig;
use crate::error::Result;
use crate::extract;
use crate::normalize;
use crate::search::SearchClient;
use crate::types::{Citation, ProductRecord, ProductSource, SourceTag};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Last-resort source: identify the product from generic web search results,
/// then corroborate Canadian origin with a second, narrower query.
///
/// Phase 2 only runs after phase 1 produced a name, and its query is built
/// from phase 1's output, so the two calls are strictly sequential.
pub struct WebSearchSource {
    search: Arc<dyn SearchClient>,
    settings: WebSearchConfig,
}

impl WebSearchSource {
    pub fn new(search: Arc<dyn SearchClient>, settings: WebSearchConfig) -> Self {
        Self { search, settings }
    }

    /// Share of confirmation results that mention Canadian origin. No
    /// results means no corroborating evidence: confidence 0, not an error.
    fn origin_confidence(&self, hits: &[crate::search::SearchHit]) -> f64 {
        if hits.is_empty() {
            return 0.0;
        }
        let mentions = hits
            .iter()
            .filter(|hit| {
                classifier::mentions_canadian_origin(&format!("{} {}", hit.title, hit.snippet))
            })
            .count();
        mentions as f64 / hits.len() as f64
    }
}

#[async_trait::async_trait]
impl ProductSource for WebSearchSource {
    fn source_tag(&self) -> SourceTag {
        SourceTag::WebSearch
    }

    #[instrument(skip(self))]
    async fn fetch(&self, barcode: &str) -> Result<Option<ProductRecord>> {
        // Phase 1: identify the product from the barcode alone
        let query = format!("{barcode} product information");
        let hits = self
            .search
            .search(&query, self.settings.identification_results)
            .await?;
        if hits.is_empty() {
            debug!("No search results for barcode {}", barcode);
            return Ok(None);
        }

        let Some(info) = extract::extract_product_info(&hits) else {
            debug!("Could not extract a product name for barcode {}", barcode);
            return Ok(None);
        };
        let mut record = normalize::from_web_extraction(barcode, &info);

        // Phase 2: corroborate origin. A failed confirmation search is a
        // low-confidence negative signal, not a failed lookup.
        let confirm_query = format!("{} {} made in Canada", info.name, info.brand);
        let confirm_hits = match self
            .search
            .search(confirm_query.trim(), self.settings.confirmation_results)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                warn!("Origin confirmation search failed for {}: {}", barcode, e);
                Vec::new()
            }
        };

        let confidence = self.origin_confidence(&confirm_hits);
        record.is_canadian = record.is_canadian || confidence > self.settings.confidence_threshold;
        record.provenance.confidence = Some(confidence);
        record.provenance.citations = Some(
            hits.iter()
                .take(self.settings.citation_limit)
                .map(|hit| Citation {
                    title: hit.title.clone(),
                    link: hit.link.clone(),
                    snippet: hit.snippet.clone(),
                })
                .collect(),
        );

        Ok(Some(record))
    }
}
