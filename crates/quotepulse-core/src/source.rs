//! Upstream adapter contract.
//!
//! A [`QuoteSource`] performs exactly one timeout-bounded upstream call per
//! invocation. Adapters hold no retry logic, no caching, and no store
//! access; resilience lives in [`crate::fetcher`].

use std::future::Future;
use std::pin::Pin;

use crate::{Quote, Symbol, UpstreamError};

/// Single-call quote provider contract.
///
/// Implementations must be `Send + Sync` as they are shared across
/// connection tasks.
pub trait QuoteSource: Send + Sync {
    /// Short provider identifier used in logs.
    fn id(&self) -> &'static str;

    /// Fetch one live quote for `symbol`.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] classifying the failure:
    /// - `RateLimited`: the provider refused the call, notice verbatim
    /// - `Malformed`: the response could not be interpreted as a quote
    /// - `Transport`: network failure, timeout, or non-success status
    fn fetch_quote<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Quote, UpstreamError>> + Send + 'a>>;
}
