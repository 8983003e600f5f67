//! Queryable store for cleaned sales data

use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::records::CleanedRecord;

/// Name of the materialized view holding the cleaned rows.
pub const CLEANED_TABLE: &str = "cleaned_sales";

/// Store schema version, recorded in schema_info.
const SCHEMA_VERSION: i32 = 1;

/// Errors that can occur while writing to the store
#[derive(Error, Debug)]
pub enum PersistError {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),
}

impl From<duckdb::Error> for PersistError {
    fn from(err: duckdb::Error) -> Self {
        PersistError::Database(err.to_string())
    }
}

/// Embedded DuckDB store scoped to one run (or a configured shared location).
pub struct SalesDb {
    conn: duckdb::Connection,
    path: Option<String>,
}

impl SalesDb {
    /// Open or create a store at the given path
    pub fn open(path: &Path) -> Result<Self, PersistError> {
        let conn = duckdb::Connection::open(path)?;
        Ok(Self {
            conn,
            path: Some(path.display().to_string()),
        })
    }

    /// Open an in-memory store (for testing)
    pub fn memory() -> Result<Self, PersistError> {
        let conn = duckdb::Connection::open_in_memory()?;
        Ok(Self { conn, path: None })
    }

    /// Get the store path (if not in-memory)
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Initialize store metadata. Idempotent.
    pub fn init(&self) -> Result<(), PersistError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_info (
                key VARCHAR PRIMARY KEY,
                value VARCHAR NOT NULL
            );",
        )?;
        self.conn.execute(
            "INSERT INTO schema_info (key, value) VALUES ('version', ?1)
             ON CONFLICT (key) DO UPDATE SET value = ?1",
            [SCHEMA_VERSION.to_string()],
        )?;
        Ok(())
    }

    /// Replace the cleaned_sales table with the given record set.
    ///
    /// Prior content for the table is fully discarded; other tables in the
    /// store are untouched.
    pub fn replace_cleaned_sales(&self, records: &[CleanedRecord]) -> Result<(), PersistError> {
        self.conn.execute_batch(
            r#"
CREATE OR REPLACE TABLE cleaned_sales (
    order_id VARCHAR NOT NULL,
    "date" DATE NOT NULL,
    region VARCHAR NOT NULL,
    quantity BIGINT NOT NULL,
    price DOUBLE NOT NULL,
    total_amount DOUBLE NOT NULL,
    month VARCHAR NOT NULL
);
"#,
        )?;

        let mut stmt = self.conn.prepare(
            "INSERT INTO cleaned_sales (order_id, \"date\", region, quantity, price, total_amount, month)
             VALUES (?1, CAST(?2 AS DATE), ?3, ?4, ?5, ?6, ?7)",
        )?;
        for record in records {
            stmt.execute(duckdb::params![
                record.order_id,
                record.date.format("%Y-%m-%d").to_string(),
                record.region,
                record.quantity,
                record.price,
                record.total_amount,
                record.month,
            ])?;
        }

        debug!(rows = records.len(), table = CLEANED_TABLE, "Replaced cleaned table");
        Ok(())
    }

    /// Row count of the cleaned_sales table
    pub fn cleaned_count(&self) -> Result<i64, PersistError> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM cleaned_sales", [], |row| row.get(0))?;
        Ok(count)
    }
}
