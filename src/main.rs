use clap::{Parser, Subcommand};
use maplecheck::config::{Config, Credentials};
use maplecheck::logging;
use maplecheck::resolver::Resolver;
use maplecheck::storage::ProductStore;
use maplecheck::types::{LookupResult, ProductRecord};
use std::sync::Arc;
use tracing::error;

#[derive(Parser)]
#[command(name = "maplecheck")]
#[command(about = "Barcode-to-product lookup with Canadian origin detection")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a barcode through the source waterfall
    Lookup {
        barcode: String,
    },
    /// Search stored products by name, brand, or category
    Search {
        query: String,
        /// Only return Canadian products
        #[arg(long)]
        canadian: bool,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// List Canadian alternatives for a stored product
    Alternatives {
        barcode: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

fn print_product(record: &ProductRecord) {
    let flag = if record.is_canadian { "🍁 Canadian" } else { "Not Canadian" };
    println!("\n📦 {} ({})", record.name, record.barcode);
    if !record.brand.is_empty() {
        println!("   Brand: {}", record.brand);
    }
    if !record.category.is_empty() {
        println!("   Category: {}", record.category);
    }
    if !record.origin.countries.is_empty() {
        println!("   Countries: {}", record.origin.countries);
    }
    println!("   Origin: {}", flag);
    println!("   Source: {}", record.provenance.source);
    if let Some(confidence) = record.provenance.confidence {
        println!("   Confidence: {:.0}%", confidence * 100.0);
    }
    if let Some(citations) = &record.provenance.citations {
        for citation in citations {
            println!("   ↳ {} ({})", citation.title, citation.link);
        }
    }
}

async fn build_store() -> Result<Arc<dyn ProductStore>, Box<dyn std::error::Error>> {
    #[cfg(feature = "db")]
    {
        let store = maplecheck::db::TursoStore::connect().await?;
        store.run_migrations().await?;
        Ok(Arc::new(store))
    }
    #[cfg(not(feature = "db"))]
    {
        Ok(Arc::new(maplecheck::storage::InMemoryStore::new()))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;
    let credentials = Credentials::from_env();
    let store = build_store().await?;

    match cli.command {
        Commands::Lookup { barcode } => {
            println!("🔍 Looking up {barcode}...");
            let resolver = Resolver::from_config(&config, &credentials, store);
            match resolver.resolve(&barcode).await {
                LookupResult::Found { record } => print_product(&record),
                LookupResult::NotFound { reason } => {
                    println!("❌ {reason}");
                }
            }
        }
        Commands::Search {
            query,
            canadian,
            limit,
        } => {
            let results = if canadian {
                store.search_canadian(&query, limit).await
            } else {
                store.search(&query, limit).await
            };
            match results {
                Ok(products) if products.is_empty() => {
                    println!("No products match \"{query}\"");
                }
                Ok(products) => {
                    println!("Found {} product(s):", products.len());
                    for product in &products {
                        print_product(product);
                    }
                }
                Err(e) => {
                    error!("Search failed: {}", e);
                    println!("❌ Search failed: {e}");
                }
            }
        }
        Commands::Alternatives { barcode, limit } => {
            match store.canadian_alternatives(&barcode, limit).await {
                Ok(products) if products.is_empty() => {
                    println!("No Canadian alternatives found for {barcode}");
                }
                Ok(products) => {
                    println!("🍁 {} Canadian alternative(s):", products.len());
                    for product in &products {
                        print_product(product);
                    }
                }
                Err(e) => {
                    error!("Alternatives query failed: {}", e);
                    println!("❌ Alternatives query failed: {e}");
                }
            }
        }
    }
    Ok(())
}
