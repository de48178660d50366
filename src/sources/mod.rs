pub mod cache;
pub mod go_upc;
pub mod open_food_facts;
pub mod upc_database;
pub mod web_search;

pub use cache::CacheSource;
pub use go_upc::GoUpcSource;
pub use open_food_facts::OpenFoodFactsSource;
pub use upc_database::UpcDatabaseSource;
pub use web_search::WebSearchSource;
