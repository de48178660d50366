use crate::config::{Config, Credentials, LookupConfig};
use crate::normalize::UNKNOWN_PRODUCT;
use crate::search::GoogleSearchClient;
use crate::sources::{
    CacheSource, GoUpcSource, OpenFoodFactsSource, UpcDatabaseSource, WebSearchSource,
};
use crate::storage::ProductStore;
use crate::types::{LookupResult, ProductRecord, ProductSource, SourceTag};
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{info, instrument, warn};

/// Drives the ordered source waterfall for one barcode at a time.
///
/// Sources are consulted cheapest-and-most-reliable first; the first hit
/// wins and is written through to the store so the next lookup for the same
/// barcode lands on the cache. A failing source only costs its own slot in
/// the chain. Dropping the returned future cancels whichever fetch is in
/// flight and abandons the rest of the chain.
pub struct Resolver {
    sources: Vec<Box<dyn ProductSource>>,
    store: Arc<dyn ProductStore>,
    settings: LookupConfig,
}

impl Resolver {
    pub fn new(
        sources: Vec<Box<dyn ProductSource>>,
        store: Arc<dyn ProductStore>,
        settings: LookupConfig,
    ) -> Self {
        Self {
            sources,
            store,
            settings,
        }
    }

    /// Build the production chain: cache, then Open Food Facts, then the
    /// credential-gated paid sources in cost order. An unconfigured source
    /// is left out of the chain entirely rather than attempted and failed.
    pub fn from_config(
        config: &Config,
        credentials: &Credentials,
        store: Arc<dyn ProductStore>,
    ) -> Self {
        let mut sources: Vec<Box<dyn ProductSource>> = vec![
            Box::new(CacheSource::new(store.clone())),
            Box::new(OpenFoodFactsSource::new()),
        ];
        if let Some(key) = &credentials.upc_database_key {
            sources.push(Box::new(UpcDatabaseSource::new(
                credentials.upc_database_api.clone(),
                key.clone(),
            )));
        }
        if let Some(key) = &credentials.go_upc_key {
            sources.push(Box::new(GoUpcSource::new(
                credentials.go_upc_api.clone(),
                key.clone(),
            )));
        }
        if let (Some(key), Some(engine_id)) =
            (&credentials.google_api_key, &credentials.google_engine_id)
        {
            let search = Arc::new(GoogleSearchClient::new(key.clone(), engine_id.clone()));
            sources.push(Box::new(WebSearchSource::new(
                search,
                config.web_search.clone(),
            )));
        }
        info!("Resolver configured with {} sources", sources.len());
        Self::new(sources, store, config.lookup.clone())
    }

    fn timeout_for(&self, tag: SourceTag) -> Duration {
        // The web-search source issues two sequential network calls
        let secs = match tag {
            SourceTag::WebSearch => self.settings.web_search_timeout_secs,
            _ => self.settings.source_timeout_secs,
        };
        Duration::from_secs(secs)
    }

    fn is_soft_miss(&self, record: &ProductRecord) -> bool {
        self.settings.placeholder_name_is_miss
            && (record.name.is_empty() || record.name == UNKNOWN_PRODUCT)
    }

    /// Resolve a barcode to the best available product record.
    ///
    /// Never returns an error for data conditions: a barcode nothing knows
    /// about comes back as `NotFound`, and a source failure only moves the
    /// waterfall along.
    #[instrument(skip(self))]
    pub async fn resolve(&self, barcode: &str) -> LookupResult {
        let t_resolve = Instant::now();
        counter!("maplecheck_lookups_total").increment(1);

        for source in &self.sources {
            let tag = source.source_tag();
            let t_fetch = Instant::now();
            let outcome = timeout(self.timeout_for(tag), source.fetch(barcode)).await;
            let latency_ms = t_fetch.elapsed().as_millis() as u64;
            histogram!("maplecheck_source_fetch_duration_seconds", "source" => tag.as_str())
                .record(t_fetch.elapsed().as_secs_f64());

            let record = match outcome {
                Err(_) => {
                    warn!(barcode, source = %tag, latency_ms, outcome = "error", "Source timed out");
                    counter!("maplecheck_source_attempts_total", "source" => tag.as_str(), "outcome" => "error").increment(1);
                    continue;
                }
                Ok(Err(e)) => {
                    warn!(barcode, source = %tag, latency_ms, outcome = "error", error = %e, "Source failed");
                    counter!("maplecheck_source_attempts_total", "source" => tag.as_str(), "outcome" => "error").increment(1);
                    continue;
                }
                Ok(Ok(None)) => {
                    info!(barcode, source = %tag, latency_ms, outcome = "miss", "Source miss");
                    counter!("maplecheck_source_attempts_total", "source" => tag.as_str(), "outcome" => "miss").increment(1);
                    continue;
                }
                Ok(Ok(Some(record))) => record,
            };

            if self.is_soft_miss(&record) {
                info!(barcode, source = %tag, latency_ms, outcome = "miss", "Placeholder name, treating as miss");
                counter!("maplecheck_source_attempts_total", "source" => tag.as_str(), "outcome" => "miss").increment(1);
                continue;
            }

            info!(barcode, source = %tag, latency_ms, outcome = "hit", "Source hit");
            counter!("maplecheck_source_attempts_total", "source" => tag.as_str(), "outcome" => "hit").increment(1);

            // Cache hits are already persisted; everything else is written
            // through so the next lookup stays local
            let record = if tag == SourceTag::Cache {
                record
            } else {
                self.persist(record).await
            };

            let total_latency_ms = t_resolve.elapsed().as_millis() as u64;
            info!(barcode, final_source = %tag, total_latency_ms, "Lookup resolved");
            histogram!("maplecheck_resolve_duration_seconds")
                .record(t_resolve.elapsed().as_secs_f64());
            return LookupResult::found(record);
        }

        let total_latency_ms = t_resolve.elapsed().as_millis() as u64;
        info!(barcode, final_source = "none", total_latency_ms, "Lookup exhausted all sources");
        histogram!("maplecheck_resolve_duration_seconds").record(t_resolve.elapsed().as_secs_f64());
        LookupResult::not_found("not found in any source")
    }

    /// Write-through after a successful resolution. A storage failure is
    /// logged and costs only the cache warming, never the lookup result.
    async fn persist(&self, record: ProductRecord) -> ProductRecord {
        match self.store.upsert(&record).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(barcode = %record.barcode, error = %e, "Failed to persist resolved product");
                counter!("maplecheck_persist_failures_total").increment(1);
                record
            }
        }
    }
}
