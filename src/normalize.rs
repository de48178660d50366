use crate::classifier;
use crate::extract::ExtractedProduct;
use crate::types::{ProductRecord, SourceTag};
use serde_json::Value;

/// Placeholder name used when a source has a match but no usable title
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

fn text(value: &Value, key: &str) -> String {
    value[key].as_str().unwrap_or("").to_string()
}

fn text_or_unknown(value: &Value, key: &str) -> String {
    match value[key].as_str() {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => UNKNOWN_PRODUCT.to_string(),
    }
}

/// Open Food Facts nests everything under a `product` object and already
/// speaks the canonical vocabulary, including the three origin fields.
pub fn from_open_food_facts(barcode: &str, body: &Value) -> Option<ProductRecord> {
    let product = body.get("product")?;
    if !product.is_object() {
        return None;
    }

    let mut record = ProductRecord::new(barcode, SourceTag::OpenFoodFacts);
    record.name = text(product, "product_name");
    record.brand = text(product, "brands");
    record.image_url = text(product, "image_url");
    record.category = text(product, "categories");
    record.description = text(product, "generic_name");
    record.ingredients = text(product, "ingredients_text");
    record.origin.countries = text(product, "countries");
    record.origin.manufacturing_places = text(product, "manufacturing_places");
    record.origin.origins = text(product, "origins");
    classifier::classify(&mut record);
    Some(record)
}

/// The UPC database wraps its payload in a `success` flag and `data` object,
/// nests images in an array, and reports origin as a single `country`.
pub fn from_upc_database(barcode: &str, body: &Value) -> Option<ProductRecord> {
    if !body["success"].as_bool().unwrap_or(false) {
        return None;
    }
    let item = body.get("data")?;

    let mut record = ProductRecord::new(barcode, SourceTag::UpcDatabase);
    record.name = text_or_unknown(item, "title");
    record.brand = text(item, "brand");
    record.image_url = item["images"]
        .as_array()
        .and_then(|images| images.first())
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    record.category = text(item, "category");
    record.origin.countries = text(item, "country");
    record.origin.manufacturing_places = text(item, "manufacturer");
    record.origin.origins = text(item, "country");
    classifier::classify(&mut record);
    Some(record)
}

/// Go-UPC returns a flat `product` object and calls the origin `region`
pub fn from_go_upc(barcode: &str, body: &Value) -> Option<ProductRecord> {
    let product = body.get("product")?;
    if !product.is_object() {
        return None;
    }

    let mut record = ProductRecord::new(barcode, SourceTag::GoUpc);
    record.name = text_or_unknown(product, "name");
    record.brand = text(product, "brand");
    record.image_url = text(product, "imageUrl");
    record.category = text(product, "category");
    record.origin.countries = text(product, "region");
    record.origin.manufacturing_places = text(product, "manufacturer");
    record.origin.origins = text(product, "region");
    classifier::classify(&mut record);
    Some(record)
}

/// Web-search extraction carries no structured origin signal; the country
/// fields stay empty and the confidence protocol fills in the rest.
pub fn from_web_extraction(barcode: &str, info: &ExtractedProduct) -> ProductRecord {
    let mut record = ProductRecord::new(barcode, SourceTag::WebSearch);
    record.name = info.name.clone();
    record.brand = info.brand.clone();
    record.category = info.category.clone();
    classifier::classify(&mut record);
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn open_food_facts_maps_canonical_fields() {
        let body = json!({
            "product": {
                "product_name": "Pure Maple Syrup",
                "brands": "AcmeCo",
                "image_url": "https://images.example/syrup.jpg",
                "categories": "Sweeteners, Syrups",
                "generic_name": "Maple syrup",
                "ingredients_text": "Maple sap",
                "countries": "Canada",
                "manufacturing_places": "Quebec",
                "origins": "Canada"
            }
        });

        let record = from_open_food_facts("0123456789012", &body).unwrap();
        assert_eq!(record.name, "Pure Maple Syrup");
        assert_eq!(record.brand, "AcmeCo");
        assert_eq!(record.origin.countries, "Canada");
        assert!(record.is_canadian);
        assert_eq!(record.provenance.source, SourceTag::OpenFoodFacts);
    }

    #[test]
    fn open_food_facts_without_product_is_a_miss() {
        assert!(from_open_food_facts("0123456789012", &json!({"status": "failure"})).is_none());
    }

    #[test]
    fn missing_fields_become_empty_strings() {
        let body = json!({"product": {"product_name": "Mystery Snack"}});
        let record = from_open_food_facts("0123456789012", &body).unwrap();
        assert_eq!(record.brand, "");
        assert_eq!(record.origin.countries, "");
        assert!(!record.is_canadian);
    }

    #[test]
    fn upc_database_maps_nested_image_and_country() {
        let body = json!({
            "success": true,
            "data": {
                "title": "Organic Oats",
                "brand": "Farmco",
                "images": ["https://images.example/oats.jpg", "https://images.example/alt.jpg"],
                "category": "Cereal",
                "country": "Canada",
                "manufacturer": "Farmco Mills"
            }
        });

        let record = from_upc_database("0123456789012", &body).unwrap();
        assert_eq!(record.image_url, "https://images.example/oats.jpg");
        assert_eq!(record.origin.countries, "Canada");
        assert_eq!(record.origin.origins, "Canada");
        assert_eq!(record.origin.manufacturing_places, "Farmco Mills");
        assert!(record.is_canadian);
    }

    #[test]
    fn upc_database_failure_flag_is_a_miss() {
        assert!(from_upc_database("0123456789012", &json!({"success": false})).is_none());
    }

    #[test]
    fn upc_database_untitled_match_gets_placeholder_name() {
        let body = json!({"success": true, "data": {"brand": "Farmco"}});
        let record = from_upc_database("0123456789012", &body).unwrap();
        assert_eq!(record.name, UNKNOWN_PRODUCT);
    }

    #[test]
    fn go_upc_maps_region_to_both_origin_fields() {
        let body = json!({
            "product": {
                "name": "Ice Wine",
                "brand": "Niagara Cellars",
                "imageUrl": "https://images.example/wine.jpg",
                "category": "Wine",
                "region": "Ontario, Canada",
                "manufacturer": "Niagara Cellars Inc"
            }
        });

        let record = from_go_upc("0123456789012", &body).unwrap();
        assert_eq!(record.origin.countries, "Ontario, Canada");
        assert_eq!(record.origin.origins, "Ontario, Canada");
        assert!(record.is_canadian);
        assert_eq!(record.provenance.source, SourceTag::GoUpc);
    }

    #[test]
    fn web_extraction_has_empty_origin_fields() {
        let info = ExtractedProduct {
            name: "Maple Syrup".to_string(),
            brand: "AcmeCo".to_string(),
            category: "Breakfast".to_string(),
        };
        let record = from_web_extraction("0123456789012", &info);
        assert_eq!(record.name, "Maple Syrup");
        assert_eq!(record.origin.countries, "");
        assert!(!record.is_canadian);
        assert_eq!(record.provenance.source, SourceTag::WebSearch);
    }
}
