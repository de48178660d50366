use crate::error::Result;
use crate::types::ProductRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Persistence contract the resolver writes through. Keyed by barcode;
/// upsert semantics are the storage layer's, so concurrent writers for the
/// same barcode settle last-write-wins.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn get_by_barcode(&self, barcode: &str) -> Result<Option<ProductRecord>>;
    async fn upsert(&self, record: &ProductRecord) -> Result<ProductRecord>;

    /// Case-insensitive match over name, brand, and category
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<ProductRecord>>;
    async fn search_canadian(&self, query: &str, limit: usize) -> Result<Vec<ProductRecord>>;

    /// Canadian products sharing a category token or brand with the given
    /// barcode's record, excluding the record itself
    async fn canadian_alternatives(&self, barcode: &str, limit: usize)
        -> Result<Vec<ProductRecord>>;
}

fn matches_query(record: &ProductRecord, query: &str) -> bool {
    let query = query.to_lowercase();
    record.name.to_lowercase().contains(&query)
        || record.brand.to_lowercase().contains(&query)
        || record.category.to_lowercase().contains(&query)
}

fn category_tokens(category: &str) -> Vec<String> {
    category
        .split(',')
        .map(|token| token.trim().to_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Whether a candidate is a plausible alternative for the original:
/// same brand, or at least one shared category token
pub fn is_alternative(original: &ProductRecord, candidate: &ProductRecord) -> bool {
    if candidate.barcode == original.barcode {
        return false;
    }
    let brand = original.brand.trim().to_lowercase();
    if !brand.is_empty() && candidate.brand.trim().to_lowercase() == brand {
        return true;
    }
    let original_tokens = category_tokens(&original.category);
    category_tokens(&candidate.category)
        .iter()
        .any(|token| original_tokens.contains(token))
}

/// In-memory store implementation for development/testing
pub struct InMemoryStore {
    products: Arc<Mutex<HashMap<String, ProductRecord>>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            products: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn get_by_barcode(&self, barcode: &str) -> Result<Option<ProductRecord>> {
        let products = self.products.lock().unwrap();
        Ok(products.get(barcode).cloned())
    }

    async fn upsert(&self, record: &ProductRecord) -> Result<ProductRecord> {
        let mut products = self.products.lock().unwrap();
        products.insert(record.barcode.clone(), record.clone());
        debug!("Upserted product {} ({})", record.barcode, record.name);
        Ok(record.clone())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<ProductRecord>> {
        let products = self.products.lock().unwrap();
        let mut results: Vec<ProductRecord> = products
            .values()
            .filter(|record| matches_query(record, query))
            .cloned()
            .collect();
        results.sort_by(|a, b| a.name.cmp(&b.name));
        results.truncate(limit);
        Ok(results)
    }

    async fn search_canadian(&self, query: &str, limit: usize) -> Result<Vec<ProductRecord>> {
        let products = self.products.lock().unwrap();
        let mut results: Vec<ProductRecord> = products
            .values()
            .filter(|record| record.is_canadian && matches_query(record, query))
            .cloned()
            .collect();
        results.sort_by(|a, b| a.name.cmp(&b.name));
        results.truncate(limit);
        Ok(results)
    }

    async fn canadian_alternatives(
        &self,
        barcode: &str,
        limit: usize,
    ) -> Result<Vec<ProductRecord>> {
        let products = self.products.lock().unwrap();
        let Some(original) = products.get(barcode).cloned() else {
            return Ok(Vec::new());
        };
        let mut results: Vec<ProductRecord> = products
            .values()
            .filter(|candidate| candidate.is_canadian && is_alternative(&original, candidate))
            .cloned()
            .collect();
        results.sort_by(|a, b| a.name.cmp(&b.name));
        results.truncate(limit);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceTag;

    fn record(barcode: &str, name: &str, brand: &str, category: &str, canadian: bool) -> ProductRecord {
        let mut record = ProductRecord::new(barcode, SourceTag::OpenFoodFacts);
        record.name = name.to_string();
        record.brand = brand.to_string();
        record.category = category.to_string();
        record.is_canadian = canadian;
        record
    }

    #[tokio::test]
    async fn upsert_then_get_round_trips() {
        let store = InMemoryStore::new();
        store
            .upsert(&record("0064200116473", "Maple Syrup", "AcmeCo", "Breakfast", true))
            .await
            .unwrap();

        let found = store.get_by_barcode("0064200116473").await.unwrap().unwrap();
        assert_eq!(found.name, "Maple Syrup");
        assert!(store.get_by_barcode("0000000000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_replaces_existing_record() {
        let store = InMemoryStore::new();
        store
            .upsert(&record("0064200116473", "Maple Syrup", "", "", false))
            .await
            .unwrap();
        store
            .upsert(&record("0064200116473", "Pure Maple Syrup", "AcmeCo", "", true))
            .await
            .unwrap();

        let found = store.get_by_barcode("0064200116473").await.unwrap().unwrap();
        assert_eq!(found.name, "Pure Maple Syrup");
        assert!(found.is_canadian);
    }

    #[tokio::test]
    async fn search_matches_name_brand_and_category() {
        let store = InMemoryStore::new();
        store
            .upsert(&record("1", "Maple Syrup", "AcmeCo", "Breakfast", true))
            .await
            .unwrap();
        store
            .upsert(&record("2", "Crackers", "Snacktime", "Snacks", false))
            .await
            .unwrap();

        assert_eq!(store.search("maple", 50).await.unwrap().len(), 1);
        assert_eq!(store.search("snacktime", 50).await.unwrap().len(), 1);
        assert_eq!(store.search("snacks", 50).await.unwrap().len(), 1);
        assert!(store.search("pasta", 50).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn canadian_search_filters_on_the_flag() {
        let store = InMemoryStore::new();
        store
            .upsert(&record("1", "Maple Syrup", "AcmeCo", "Breakfast", true))
            .await
            .unwrap();
        store
            .upsert(&record("2", "Maple Candy", "Sweets Inc", "Candy", false))
            .await
            .unwrap();

        let results = store.search_canadian("maple", 50).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].barcode, "1");
    }

    #[tokio::test]
    async fn alternatives_share_category_or_brand_and_exclude_self() {
        let store = InMemoryStore::new();
        store
            .upsert(&record("1", "US Granola", "Plainfield", "Cereal, Breakfast", false))
            .await
            .unwrap();
        store
            .upsert(&record("2", "Canadian Granola", "Northfield", "Breakfast", true))
            .await
            .unwrap();
        store
            .upsert(&record("3", "Canadian Socks", "Cozy", "Apparel", true))
            .await
            .unwrap();
        store
            .upsert(&record("4", "Plainfield Oat Bar", "Plainfield", "Bars", true))
            .await
            .unwrap();

        let alternatives = store.canadian_alternatives("1", 10).await.unwrap();
        let barcodes: Vec<&str> = alternatives.iter().map(|r| r.barcode.as_str()).collect();
        assert_eq!(barcodes, vec!["2", "4"]);
    }

    #[tokio::test]
    async fn alternatives_for_unknown_barcode_are_empty() {
        let store = InMemoryStore::new();
        assert!(store.canadian_alternatives("404", 10).await.unwrap().is_empty());
    }
}
