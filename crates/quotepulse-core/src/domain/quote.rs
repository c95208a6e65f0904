use serde::{Deserialize, Serialize};

use crate::{Symbol, UtcDateTime, ValidationError};

/// Where a quote's price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteOrigin {
    /// Fresh price from the upstream provider.
    Live,
    /// Price replayed from the durable fallback store.
    Cached,
}

/// A quote as produced by the fetcher.
///
/// Exactly one of three shapes per instance: a live quote, a cached quote
/// (`origin == Cached`), or a failure quote (`failure_reason` set, price
/// forced to zero).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: Symbol,
    pub price: f64,
    pub observed_at: UtcDateTime,
    pub origin: QuoteOrigin,
    pub failure_reason: Option<String>,
}

impl Quote {
    /// Build a live quote with a validated price.
    pub fn live(
        symbol: Symbol,
        price: f64,
        observed_at: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        validate_price(price)?;
        Ok(Self {
            symbol,
            price,
            observed_at,
            origin: QuoteOrigin::Live,
            failure_reason: None,
        })
    }

    /// Build a cached quote from a fallback record.
    ///
    /// The record's original observation time is kept so consumers can tell
    /// how stale the price is. Values were validated when first stored.
    pub fn cached(symbol: Symbol, price: f64, observed_at: UtcDateTime) -> Self {
        Self {
            symbol,
            price,
            observed_at,
            origin: QuoteOrigin::Cached,
            failure_reason: None,
        }
    }

    /// Build a failure quote. Price is forced to zero.
    pub fn failed(symbol: Symbol, reason: impl Into<String>) -> Self {
        Self {
            symbol,
            price: 0.0,
            observed_at: UtcDateTime::now(),
            origin: QuoteOrigin::Live,
            failure_reason: Some(reason.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.failure_reason.is_some()
    }

    pub fn is_cached(&self) -> bool {
        self.origin == QuoteOrigin::Cached
    }
}

fn validate_price(price: f64) -> Result<(), ValidationError> {
    if !price.is_finite() {
        return Err(ValidationError::NonFiniteValue { field: "price" });
    }
    if price < 0.0 {
        return Err(ValidationError::NegativeValue { field: "price" });
    }
    Ok(())
}
