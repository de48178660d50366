use crate::constants;
use crate::error::{LookupError, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Tunable parameters loaded from config.toml. A missing file falls back to
/// the defaults; a malformed file is a startup error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub lookup: LookupConfig,
    #[serde(default)]
    pub web_search: WebSearchConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Per-call timeout for the structured lookup APIs
    pub source_timeout_secs: u64,
    /// Timeout for the web-search source, which issues two sequential calls
    pub web_search_timeout_secs: u64,
    /// Treat hits whose name is empty or "Unknown Product" as misses and
    /// keep going down the waterfall
    pub placeholder_name_is_miss: bool,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            source_timeout_secs: 8,
            web_search_timeout_secs: 15,
            placeholder_name_is_miss: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebSearchConfig {
    /// Result count for the identification query (barcode + qualifier)
    pub identification_results: u32,
    /// Result count for the origin-confirmation query
    pub confirmation_results: u32,
    /// Minimum share of confirmation results that must corroborate
    /// Canadian origin
    pub confidence_threshold: f64,
    /// How many identification results to keep as citations
    pub citation_limit: usize,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            identification_results: 10,
            confirmation_results: 5,
            confidence_threshold: 0.30,
            citation_limit: 3,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    pub fn load_from(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            debug!("No config file at '{}', using defaults", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            LookupError::Config(format!("Failed to read config file '{path}': {e}"))
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// API credentials and endpoint overrides, read once from the process
/// environment at startup. An absent credential disables its source.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub upc_database_api: String,
    pub upc_database_key: Option<String>,
    pub go_upc_api: String,
    pub go_upc_key: Option<String>,
    pub google_api_key: Option<String>,
    pub google_engine_id: Option<String>,
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

impl Credentials {
    pub fn from_env() -> Self {
        Self {
            upc_database_api: env::var("UPC_DATABASE_API")
                .unwrap_or_else(|_| constants::UPC_DATABASE_API.to_string()),
            upc_database_key: non_empty("UPC_DATABASE_API_KEY"),
            go_upc_api: env::var("GO_UPC_API")
                .unwrap_or_else(|_| constants::GO_UPC_API.to_string()),
            go_upc_key: non_empty("GO_UPC_API_KEY"),
            google_api_key: non_empty("GOOGLE_API_KEY"),
            google_engine_id: non_empty("GOOGLE_SEARCH_ENGINE_ID"),
        }
    }

    /// Both the API key and the engine id are required for web search
    pub fn web_search_configured(&self) -> bool {
        self.google_api_key.is_some() && self.google_engine_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_production_tuning() {
        let config = Config::default();
        assert_eq!(config.web_search.identification_results, 10);
        assert_eq!(config.web_search.confirmation_results, 5);
        assert!((config.web_search.confidence_threshold - 0.30).abs() < f64::EPSILON);
        assert_eq!(config.lookup.source_timeout_secs, 8);
        assert!(!config.lookup.placeholder_name_is_miss);
    }

    #[test]
    fn partial_config_keeps_defaults_for_the_rest() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[web_search]\nconfidence_threshold = 0.5").unwrap();

        let config = Config::load_from(file.path().to_str().unwrap()).unwrap();
        assert!((config.web_search.confidence_threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.web_search.identification_results, 10);
        assert_eq!(config.lookup.web_search_timeout_secs, 15);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = Config::load_from("does-not-exist.toml").unwrap();
        assert_eq!(config.web_search.citation_limit, 3);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[web_search\nbroken").unwrap();
        assert!(Config::load_from(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn web_search_needs_both_key_and_engine_id() {
        let mut credentials = Credentials {
            upc_database_api: constants::UPC_DATABASE_API.to_string(),
            upc_database_key: None,
            go_upc_api: constants::GO_UPC_API.to_string(),
            go_upc_key: None,
            google_api_key: Some("key".to_string()),
            google_engine_id: None,
        };
        assert!(!credentials.web_search_configured());
        credentials.google_engine_id = Some("cx".to_string());
        assert!(credentials.web_search_configured());
    }
}
