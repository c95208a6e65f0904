//! WebSocket wire protocol shared by server and client.
//!
//! Events serialize as `{"type": "...", "data": {...}}`. Cadence pushes
//! use `stockUpdate`/`stockError`; out-of-band pull results use the
//! distinct `stockData` type so clients can tell them apart.

use serde::{Deserialize, Serialize};

use crate::{Quote, QuoteOrigin};

/// External JSON shape of a quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotePayload {
    pub symbol: String,
    pub price: f64,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Present only when the price was served from the fallback store.
    #[serde(default, skip_serializing_if = "is_false")]
    pub cached: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl From<&Quote> for QuotePayload {
    fn from(quote: &Quote) -> Self {
        Self {
            symbol: quote.symbol.as_str().to_owned(),
            price: quote.price,
            timestamp: quote.observed_at.format_rfc3339(),
            error: quote.failure_reason.clone(),
            cached: quote.origin == QuoteOrigin::Cached,
        }
    }
}

/// Payload for the `stockError` push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockErrorPayload {
    pub symbol: String,
    pub error: String,
    pub timestamp: String,
}

/// Server-to-client push events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Periodic cadence push.
    StockUpdate(QuotePayload),
    /// Out-of-band answer to a `requestStock`.
    StockData(QuotePayload),
    /// Total fetch failure for a cadence tick or a pull.
    StockError(StockErrorPayload),
    /// Connection liveness tick; carried as a bare ping frame on the wire.
    Keepalive,
}

/// Client-to-server events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    RequestStock { symbol: String },
    Ping,
}
