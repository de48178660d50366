use crate::types::{CanadianFactors, OriginFields, ProductRecord};

/// Phrases that count as corroboration of Canadian origin in free text
const ORIGIN_PHRASES: [&str; 3] = ["made in canada", "canadian made", "product of canada"];

fn field_matches(field: &str) -> bool {
    field.to_lowercase().contains("canada")
}

/// A product is Canadian when any origin field mentions Canada,
/// case-insensitively
pub fn is_canadian(origin: &OriginFields) -> bool {
    field_matches(&origin.countries)
        || field_matches(&origin.manufacturing_places)
        || field_matches(&origin.origins)
}

/// Per-field breakdown persisted alongside the overall determination
pub fn canadian_factors(origin: &OriginFields) -> CanadianFactors {
    CanadianFactors {
        countries: field_matches(&origin.countries),
        manufacturing: field_matches(&origin.manufacturing_places),
        origins: field_matches(&origin.origins),
    }
}

/// Recompute the derived origin determination on a freshly normalized record.
///
/// `is_canadian` is never trusted from a source; it is always a function of
/// the origin fields. The web-search source OR-merges its confidence signal
/// on top of this after calling it.
pub fn classify(record: &mut ProductRecord) {
    record.canadian_factors = canadian_factors(&record.origin);
    record.is_canadian = is_canadian(&record.origin);
}

/// Whether a title+snippet blob corroborates Canadian origin
pub fn mentions_canadian_origin(text: &str) -> bool {
    let content = text.to_lowercase();
    ORIGIN_PHRASES.iter().any(|phrase| content.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceTag;

    fn origin(countries: &str, manufacturing: &str, origins: &str) -> OriginFields {
        OriginFields {
            countries: countries.to_string(),
            manufacturing_places: manufacturing.to_string(),
            origins: origins.to_string(),
        }
    }

    #[test]
    fn countries_field_matches() {
        assert!(is_canadian(&origin("Canada", "", "")));
    }

    #[test]
    fn non_canadian_countries_do_not_match() {
        assert!(!is_canadian(&origin("United States", "", "")));
    }

    #[test]
    fn manufacturing_match_is_case_insensitive() {
        assert!(is_canadian(&origin("", "Made in CANADA", "")));
    }

    #[test]
    fn empty_fields_are_not_canadian() {
        assert!(!is_canadian(&OriginFields::default()));
    }

    #[test]
    fn factors_track_individual_fields() {
        let factors = canadian_factors(&origin("Canada", "France", "canada, usa"));
        assert!(factors.countries);
        assert!(!factors.manufacturing);
        assert!(factors.origins);
    }

    #[test]
    fn classify_overwrites_stale_flag() {
        let mut record = ProductRecord::new("0123456789012", SourceTag::OpenFoodFacts);
        record.is_canadian = true;
        classify(&mut record);
        assert!(!record.is_canadian);

        record.origin.countries = "en:canada".to_string();
        classify(&mut record);
        assert!(record.is_canadian);
        assert!(record.canadian_factors.countries);
    }

    #[test]
    fn origin_phrases_are_recognized() {
        assert!(mentions_canadian_origin("Proudly MADE IN CANADA since 1967"));
        assert!(mentions_canadian_origin("A Canadian made classic"));
        assert!(mentions_canadian_origin("certified product of canada"));
        assert!(!mentions_canadian_origin("available in Canada"));
    }
}
