/// Default endpoints for the external lookup sources. The UPC database and
/// Go-UPC bases can be overridden from the environment; Open Food Facts and
/// the search API are fixed.

pub const OPEN_FOOD_FACTS_API: &str = "https://world.openfoodfacts.org/api/v3";
pub const UPC_DATABASE_API: &str = "https://api.searchupc.com/v1";
pub const GO_UPC_API: &str = "https://api.go-upc.com/v1";
pub const GOOGLE_SEARCH_API: &str = "https://www.googleapis.com/customsearch/v1";
