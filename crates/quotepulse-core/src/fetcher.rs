//! Retrying fetcher with durable fallback.
//!
//! [`ResilientFetcher::fetch`] never fails: after bounded retries it falls
//! back to the last known stored price, and only when that is also missing
//! does it return a failure quote.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::history::{FallbackRecord, QuoteHistory};
use crate::retry::Backoff;
use crate::source::QuoteSource;
use crate::{Quote, Symbol, UpstreamError};

/// Retry policy for a single logical fetch.
#[derive(Debug, Clone, Copy)]
pub struct FetchPolicy {
    /// Total upstream attempts per fetch, including the first.
    pub max_attempts: u32,
    /// Delay schedule applied between attempts.
    pub backoff: Backoff,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::default(),
        }
    }
}

impl FetchPolicy {
    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Fetches quotes with bounded retries and cached fallback.
///
/// Holds its collaborators explicitly; construct once and share via `Arc`.
pub struct ResilientFetcher {
    source: Arc<dyn QuoteSource>,
    history: Arc<dyn QuoteHistory>,
    policy: FetchPolicy,
}

impl ResilientFetcher {
    pub fn new(
        source: Arc<dyn QuoteSource>,
        history: Arc<dyn QuoteHistory>,
        policy: FetchPolicy,
    ) -> Self {
        Self {
            source,
            history,
            policy,
        }
    }

    /// Fetch a quote, retrying per policy and falling back to the store.
    ///
    /// Returns exactly one of:
    /// - a live quote (upstream succeeded within the attempt budget)
    /// - a cached quote (all attempts failed, store had a prior price)
    /// - a failure quote (all attempts failed, store empty)
    ///
    /// Errors never escape this method.
    pub async fn fetch(&self, symbol: &Symbol) -> Quote {
        let attempts = self.policy.attempts();
        let mut last_error: Option<UpstreamError> = None;

        for attempt in 1..=attempts {
            match self.source.fetch_quote(symbol).await {
                Ok(quote) => {
                    self.record_success(&quote);
                    return quote;
                }
                Err(error) => {
                    debug!(
                        source = self.source.id(),
                        %symbol,
                        attempt,
                        kind = ?error.kind(),
                        %error,
                        "upstream fetch attempt failed"
                    );
                    let exhausted = attempt == attempts;
                    last_error = Some(error);
                    if !exhausted {
                        tokio::time::sleep(self.policy.backoff.delay(attempt)).await;
                    }
                }
            }
        }

        self.fall_back(symbol, attempts, last_error)
    }

    fn record_success(&self, quote: &Quote) {
        let record = FallbackRecord {
            symbol: quote.symbol.clone(),
            price: quote.price,
            observed_at: quote.observed_at,
        };
        if let Err(error) = self.history.record(&record) {
            // Best-effort on the write path; the live quote still flows.
            warn!(symbol = %quote.symbol, %error, "failed to persist quote for fallback");
        }
    }

    fn fall_back(&self, symbol: &Symbol, attempts: u32, last_error: Option<UpstreamError>) -> Quote {
        let last_message = last_error
            .map(|error| error.to_string())
            .unwrap_or_else(|| String::from("unknown error"));

        match self.history.last_known(symbol) {
            Ok(Some(record)) => {
                warn!(
                    %symbol,
                    attempts,
                    observed_at = %record.observed_at,
                    "upstream exhausted, serving cached quote"
                );
                Quote::cached(record.symbol, record.price, record.observed_at)
            }
            Ok(None) => {
                warn!(%symbol, attempts, "upstream exhausted with no cached fallback");
                Quote::failed(symbol.clone(), failure_reason(symbol, attempts, &last_message))
            }
            Err(error) => {
                warn!(%symbol, attempts, %error, "fallback store lookup failed");
                Quote::failed(symbol.clone(), failure_reason(symbol, attempts, &last_message))
            }
        }
    }
}

fn failure_reason(symbol: &Symbol, attempts: u32, last_message: &str) -> String {
    format!("Failed to fetch stock data for {symbol} after {attempts} attempts: {last_message}")
}
