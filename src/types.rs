use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of data sources a product record can originate from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    Cache,
    OpenFoodFacts,
    UpcDatabase,
    GoUpc,
    WebSearch,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::Cache => "cache",
            SourceTag::OpenFoodFacts => "open_food_facts",
            SourceTag::UpcDatabase => "upc_database",
            SourceTag::GoUpc => "go_upc",
            SourceTag::WebSearch => "web_search",
        }
    }
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A supporting web page kept for user-facing attribution of web-search hits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

/// Where a record came from, when, and with what supporting evidence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provenance {
    pub source: SourceTag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub fetched_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<Citation>>,
}

impl Provenance {
    /// Fresh provenance stamped by a non-cache source at fetch time
    pub fn stamped(source: SourceTag) -> Self {
        Self {
            source,
            confidence: None,
            fetched_at: Utc::now(),
            citations: None,
        }
    }
}

/// Free-text origin signals as reported by the source; the classifier
/// substring-matches these, so absent values must be empty strings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OriginFields {
    pub countries: String,
    pub manufacturing_places: String,
    pub origins: String,
}

/// Per-field breakdown of which origin signals matched Canada
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CanadianFactors {
    pub countries: bool,
    pub manufacturing: bool,
    pub origins: bool,
}

/// Canonical normalized product entity shared by every source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub barcode: String,
    pub name: String,
    pub brand: String,
    pub image_url: String,
    pub category: String,
    pub description: String,
    pub ingredients: String,
    #[serde(flatten)]
    pub origin: OriginFields,
    pub is_canadian: bool,
    pub canadian_factors: CanadianFactors,
    pub provenance: Provenance,
}

impl ProductRecord {
    /// Empty record skeleton for a barcode, stamped with the given source
    pub fn new(barcode: &str, source: SourceTag) -> Self {
        Self {
            barcode: barcode.to_string(),
            name: String::new(),
            brand: String::new(),
            image_url: String::new(),
            category: String::new(),
            description: String::new(),
            ingredients: String::new(),
            origin: OriginFields::default(),
            is_canadian: false,
            canadian_factors: CanadianFactors::default(),
            provenance: Provenance::stamped(source),
        }
    }
}

/// Outcome envelope returned to the caller; "not found" is data, not an error
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LookupResult {
    Found { record: ProductRecord },
    NotFound { reason: String },
}

impl LookupResult {
    pub fn found(record: ProductRecord) -> Self {
        LookupResult::Found { record }
    }

    pub fn not_found(reason: impl Into<String>) -> Self {
        LookupResult::NotFound {
            reason: reason.into(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, LookupResult::Found { .. })
    }

    pub fn record(&self) -> Option<&ProductRecord> {
        match self {
            LookupResult::Found { record } => Some(record),
            LookupResult::NotFound { .. } => None,
        }
    }
}

/// Core trait that all product data sources must implement
#[async_trait::async_trait]
pub trait ProductSource: Send + Sync {
    /// Unique identifier for this source
    fn source_tag(&self) -> SourceTag;

    /// Look up a barcode in this source.
    ///
    /// `Ok(None)` means the source was reachable but has no matching
    /// product; an `Err` means the call itself failed. The resolver treats
    /// both as "try the next source".
    async fn fetch(&self, barcode: &str) -> Result<Option<ProductRecord>>;
}
