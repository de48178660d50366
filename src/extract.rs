use crate::search::SearchHit;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Title markers for pages that index barcodes rather than describe products
const SKIP_MARKERS: [&str; 3] = ["UPC", "Barcode", "Database"];

static CATEGORY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:category|department|section|type)[:\s]+(\w+)").unwrap()
});

/// Best-guess product identity recovered from unstructured search results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedProduct {
    pub name: String,
    pub brand: String,
    pub category: String,
}

/// Walk the results in rank order and return the first one that yields a
/// product name. Returns `None` when nothing usable was found, which the
/// web-search source treats as a miss.
pub fn extract_product_info(hits: &[SearchHit]) -> Option<ExtractedProduct> {
    for hit in hits {
        if SKIP_MARKERS.iter().any(|marker| hit.title.contains(marker)) {
            debug!("Skipping non-product result: {}", hit.title);
            continue;
        }

        let (name, brand) = split_title(&hit.title);
        if name.is_empty() {
            continue;
        }

        let category = CATEGORY_RE
            .captures(&hit.snippet)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        return Some(ExtractedProduct {
            name,
            brand,
            category,
        });
    }
    None
}

/// Titles commonly come as "Name | Brand: X", "Name - Brand", or just a name
fn split_title(title: &str) -> (String, String) {
    if title.contains('|') {
        let mut parts = title.split('|').map(str::trim);
        let name = parts.next().unwrap_or("").to_string();
        let brand = parts
            .next()
            .unwrap_or("")
            .trim_start_matches("Brand:")
            .trim()
            .to_string();
        (name, brand)
    } else if let Some((left, right)) = title.split_once('-') {
        (left.trim().to_string(), right.trim().to_string())
    } else {
        (title.trim().to_string(), String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(title: &str, snippet: &str) -> SearchHit {
        SearchHit {
            title: title.to_string(),
            link: "https://example.com".to_string(),
            snippet: snippet.to_string(),
        }
    }

    #[test]
    fn pipe_title_splits_name_and_brand() {
        let info = extract_product_info(&[hit("Maple Syrup | Brand: AcmeCo", "")]).unwrap();
        assert_eq!(info.name, "Maple Syrup");
        assert_eq!(info.brand, "AcmeCo");
    }

    #[test]
    fn hyphen_title_splits_on_first_hyphen() {
        let info = extract_product_info(&[hit("Organic Oats - Farmco", "")]).unwrap();
        assert_eq!(info.name, "Organic Oats");
        assert_eq!(info.brand, "Farmco");
    }

    #[test]
    fn plain_title_is_the_name() {
        let info = extract_product_info(&[hit("Cheddar Crackers", "")]).unwrap();
        assert_eq!(info.name, "Cheddar Crackers");
        assert_eq!(info.brand, "");
    }

    #[test]
    fn barcode_index_pages_fall_through_to_next_result() {
        let hits = [
            hit("UPC Lookup Database Entry", ""),
            hit("Maple Syrup | Brand: AcmeCo", ""),
        ];
        let info = extract_product_info(&hits).unwrap();
        assert_eq!(info.name, "Maple Syrup");
    }

    #[test]
    fn category_comes_from_the_snippet() {
        let info =
            extract_product_info(&[hit("Maple Syrup", "Find it in Category: Breakfast aisle 3")])
                .unwrap();
        assert_eq!(info.category, "Breakfast");
    }

    #[test]
    fn first_category_keyword_wins() {
        let info = extract_product_info(&[hit(
            "Maple Syrup",
            "Department: Grocery, type: syrup",
        )])
        .unwrap();
        assert_eq!(info.category, "Grocery");
    }

    #[test]
    fn no_usable_result_is_empty() {
        assert!(extract_product_info(&[hit("UPC Database", "")]).is_none());
        assert!(extract_product_info(&[]).is_none());
    }
}
