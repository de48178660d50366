use crate::error::{LookupError, Result};
use serde::Deserialize;
use tracing::debug;

/// One web search result, the unit consumed by the extraction heuristic
/// and the origin-confidence count
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

/// Narrow transport contract for the web-search fallback; mocked in tests
#[async_trait::async_trait]
pub trait SearchClient: Send + Sync {
    /// Run a query and return up to `num_results` hits, best-ranked first.
    /// An empty result list is a valid answer, not an error.
    async fn search(&self, query: &str, num_results: u32) -> Result<Vec<SearchHit>>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

/// Google Custom Search JSON API client
pub struct GoogleSearchClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    engine_id: String,
}

impl GoogleSearchClient {
    pub fn new(api_key: String, engine_id: String) -> Self {
        Self::with_endpoint(crate::constants::GOOGLE_SEARCH_API.to_string(), api_key, engine_id)
    }

    pub fn with_endpoint(endpoint: String, api_key: String, engine_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            engine_id,
        }
    }
}

#[async_trait::async_trait]
impl SearchClient for GoogleSearchClient {
    async fn search(&self, query: &str, num_results: u32) -> Result<Vec<SearchHit>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", &num_results.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LookupError::Source {
                message: format!(
                    "search API returned status {} for query '{query}'",
                    response.status().as_u16()
                ),
            });
        }

        let body: SearchResponse = response.json().await?;
        debug!("Search for '{}' returned {} items", query, body.items.len());

        Ok(body
            .items
            .into_iter()
            .map(|item| SearchHit {
                title: item.title,
                link: item.link,
                snippet: item.snippet,
            })
            .collect())
    }
}
