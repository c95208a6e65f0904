//! # quotepulse-store
//!
//! `DuckDB`-backed durable fallback store.
//!
//! Every successful live fetch appends one `{symbol, price, observed_at}`
//! record to `quote_history`; nothing is ever updated or pruned. The
//! fallback price for a symbol is the record with the maximum
//! `observed_at`, independent of insertion order.
//!
//! All user-provided values are passed as query parameters, never
//! interpolated.

pub mod duckdb;
mod migrations;

use std::fs;
use std::path::{Path, PathBuf};

use ::duckdb::ToSql;
use thiserror::Error;

use quotepulse_core::{FallbackRecord, HistoryError, QuoteHistory, Symbol, UtcDateTime};

pub use duckdb::{AccessMode, DuckDbConnectionManager, PooledConnection};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `DuckDB` database error.
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    /// I/O error (file system operations).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A stored value could not be converted back into a domain type.
    #[error("corrupt history row: {0}")]
    CorruptRow(String),
}

/// Configuration for the fallback store database.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the `DuckDB` database file.
    pub db_path: PathBuf,
    /// Maximum number of connections kept per access mode.
    pub max_pool_size: usize,
}

impl StoreConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            max_pool_size: 4,
        }
    }
}

/// Append-only quote history backed by `DuckDB`.
#[derive(Clone)]
pub struct FallbackStore {
    manager: DuckDbConnectionManager,
}

impl FallbackStore {
    /// Open the store, creating the database file and applying migrations.
    ///
    /// # Errors
    /// Returns an error if the parent directory cannot be created, the
    /// database cannot be opened, or a migration fails.
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let manager = DuckDbConnectionManager::new(config.db_path, config.max_pool_size);
        let store = Self { manager };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> Result<(), StoreError> {
        let connection = self.manager.acquire(AccessMode::ReadWrite)?;
        migrations::apply_migrations(&connection)?;
        Ok(())
    }

    pub fn db_path(&self) -> &Path {
        self.manager.db_path()
    }

    /// Append one history record.
    ///
    /// Duplicate and out-of-order observation times are accepted; the table
    /// is append-only.
    pub fn record_quote(
        &self,
        symbol: &Symbol,
        price: f64,
        observed_at: UtcDateTime,
    ) -> Result<(), StoreError> {
        let connection = self.manager.acquire(AccessMode::ReadWrite)?;
        let symbol_str = symbol.as_str();
        let observed = observed_at.format_rfc3339();
        let params: [&dyn ToSql; 3] = [&symbol_str, &price, &observed];
        connection.execute(
            "INSERT INTO quote_history (symbol, price, observed_at) \
             VALUES (?, ?, TRY_CAST(? AS TIMESTAMP))",
            params.as_slice(),
        )?;
        Ok(())
    }

    /// The most recent record for `symbol` by observation time, if any.
    pub fn last_known_quote(
        &self,
        symbol: &Symbol,
    ) -> Result<Option<FallbackRecord>, StoreError> {
        let connection = self.manager.acquire(AccessMode::ReadOnly)?;
        let mut statement = connection.prepare(
            "SELECT price, epoch_us(observed_at) FROM quote_history \
             WHERE symbol = ? ORDER BY observed_at DESC LIMIT 1",
        )?;

        let symbol_str = symbol.as_str();
        let params: [&dyn ToSql; 1] = [&symbol_str];
        let mut rows = statement.query(params.as_slice())?;

        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let price: f64 = row.get(0)?;
        let micros: i64 = row.get(1)?;
        let observed_at = UtcDateTime::from_unix_micros(micros)
            .map_err(|error| StoreError::CorruptRow(error.to_string()))?;

        Ok(Some(FallbackRecord {
            symbol: symbol.clone(),
            price,
            observed_at,
        }))
    }

    /// Number of history records for `symbol`.
    pub fn history_len(&self, symbol: &Symbol) -> Result<usize, StoreError> {
        let connection = self.manager.acquire(AccessMode::ReadOnly)?;
        let symbol_str = symbol.as_str();
        let params: [&dyn ToSql; 1] = [&symbol_str];
        let count: i64 = connection.query_row(
            "SELECT COUNT(*) FROM quote_history WHERE symbol = ?",
            params.as_slice(),
            |row| row.get(0),
        )?;
        Ok(count.max(0) as usize)
    }
}

impl QuoteHistory for FallbackStore {
    fn record(&self, record: &FallbackRecord) -> Result<(), HistoryError> {
        self.record_quote(&record.symbol, record.price, record.observed_at)
            .map_err(|error| HistoryError::Storage(error.to_string()))
    }

    fn last_known(&self, symbol: &Symbol) -> Result<Option<FallbackRecord>, HistoryError> {
        self.last_known_quote(symbol)
            .map_err(|error| HistoryError::Storage(error.to_string()))
    }
}
