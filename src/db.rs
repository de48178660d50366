use crate::error::{LookupError, Result};
use crate::storage::{is_alternative, ProductStore};
use crate::types::ProductRecord;
use async_trait::async_trait;
use libsql::{Builder, Connection, Database, Row};
use std::env;
use tracing::info;

fn storage_err(context: &str, e: impl std::fmt::Display) -> LookupError {
    LookupError::Storage {
        message: format!("{context}: {e}"),
    }
}

/// Turso/libSQL-backed product store. Records are kept as JSON in the `data`
/// column with a few extracted columns for indexed search.
pub struct TursoStore {
    db: Database,
}

impl TursoStore {
    /// Connect using LIBSQL_URL and LIBSQL_AUTH_TOKEN from the environment
    pub async fn connect() -> Result<Self> {
        let url = env::var("LIBSQL_URL")
            .map_err(|_| storage_err("configuration", "LIBSQL_URL environment variable not set"))?;
        let auth_token = env::var("LIBSQL_AUTH_TOKEN").map_err(|_| {
            storage_err("configuration", "LIBSQL_AUTH_TOKEN environment variable not set")
        })?;

        info!("Connecting to Turso database at {}", url);

        let db = Builder::new_remote(url, auth_token)
            .build()
            .await
            .map_err(|e| storage_err("Failed to connect to database", e))?;

        Ok(Self { db })
    }

    async fn get_connection(&self) -> Result<Connection> {
        self.db
            .connect()
            .map_err(|e| storage_err("Failed to get database connection", e))
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations...");

        let conn = self.get_connection().await?;
        let migration_sql = include_str!("../migrations/001_create_products.sql");

        conn.execute_batch(migration_sql)
            .await
            .map_err(|e| storage_err("Failed to run migrations", e))?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    fn record_from_row(row: &Row) -> Result<ProductRecord> {
        let data: String = row
            .get(0)
            .map_err(|e| storage_err("Failed to read data column", e))?;
        Ok(serde_json::from_str(&data)?)
    }

    async fn query_records(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Vec<ProductRecord>> {
        let conn = self.get_connection().await?;
        let mut rows = conn
            .query(sql, params)
            .await
            .map_err(|e| storage_err("Failed to query products", e))?;

        let mut results = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| storage_err("Failed to read row", e))?
        {
            results.push(Self::record_from_row(&row)?);
        }
        Ok(results)
    }
}

#[async_trait]
impl ProductStore for TursoStore {
    async fn get_by_barcode(&self, barcode: &str) -> Result<Option<ProductRecord>> {
        let records = self
            .query_records(
                "SELECT data FROM products WHERE barcode = ?",
                libsql::params![barcode],
            )
            .await?;
        Ok(records.into_iter().next())
    }

    async fn upsert(&self, record: &ProductRecord) -> Result<ProductRecord> {
        let conn = self.get_connection().await?;
        let data = serde_json::to_string(record)?;

        // INSERT OR REPLACE keyed by barcode, preserving created_at on update
        conn.execute(
            "INSERT OR REPLACE INTO products (barcode, name, brand, category, is_canadian, data, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, COALESCE((SELECT created_at FROM products WHERE barcode = ?), datetime('now')), datetime('now'))",
            libsql::params![
                record.barcode.as_str(),
                record.name.as_str(),
                record.brand.as_str(),
                record.category.as_str(),
                record.is_canadian as i64,
                data,
                record.barcode.as_str()
            ],
        )
        .await
        .map_err(|e| storage_err("Failed to upsert product", e))?;

        Ok(record.clone())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<ProductRecord>> {
        let pattern = format!("%{}%", query.to_lowercase());
        self.query_records(
            "SELECT data FROM products WHERE lower(name) LIKE ?1 OR lower(brand) LIKE ?1 OR lower(category) LIKE ?1 ORDER BY name LIMIT ?2",
            libsql::params![pattern, limit as i64],
        )
        .await
    }

    async fn search_canadian(&self, query: &str, limit: usize) -> Result<Vec<ProductRecord>> {
        let pattern = format!("%{}%", query.to_lowercase());
        self.query_records(
            "SELECT data FROM products WHERE is_canadian = 1 AND (lower(name) LIKE ?1 OR lower(brand) LIKE ?1 OR lower(category) LIKE ?1) ORDER BY name LIMIT ?2",
            libsql::params![pattern, limit as i64],
        )
        .await
    }

    async fn canadian_alternatives(
        &self,
        barcode: &str,
        limit: usize,
    ) -> Result<Vec<ProductRecord>> {
        let Some(original) = self.get_by_barcode(barcode).await? else {
            return Ok(Vec::new());
        };

        // Category-token matching happens in Rust; the flag narrows the scan
        let candidates = self
            .query_records(
                "SELECT data FROM products WHERE is_canadian = 1 AND barcode != ? ORDER BY name",
                libsql::params![barcode],
            )
            .await?;

        let mut results: Vec<ProductRecord> = candidates
            .into_iter()
            .filter(|candidate| is_alternative(&original, candidate))
            .collect();
        results.truncate(limit);
        Ok(results)
    }
}
