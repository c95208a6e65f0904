//! Durable fallback store contract.
//!
//! The store is append-only: every successful live fetch is recorded, and
//! the most recent record per symbol (by observation time, not insertion
//! order) serves as the fallback when the upstream is unreachable.

use thiserror::Error;

use crate::{Symbol, UtcDateTime};

/// One append-only history entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackRecord {
    pub symbol: Symbol,
    pub price: f64,
    pub observed_at: UtcDateTime,
}

/// Storage-layer failure surfaced through the history contract.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("quote history storage error: {0}")]
    Storage(String),
}

/// Contract for the durable fallback store.
///
/// Implementations must tolerate concurrent callers; writes for one symbol
/// must never corrupt another symbol's history.
pub trait QuoteHistory: Send + Sync {
    /// Append a record. Duplicate and out-of-order observation times are
    /// accepted.
    fn record(&self, record: &FallbackRecord) -> Result<(), HistoryError>;

    /// The record with the maximum `observed_at` for `symbol`, if any.
    fn last_known(&self, symbol: &Symbol) -> Result<Option<FallbackRecord>, HistoryError>;
}
