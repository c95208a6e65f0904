//! # quotepulse-core
//!
//! Domain contracts for the quotepulse quote distribution system.
//!
//! This crate holds everything the server and client share:
//!
//! - [`domain`]: validated domain types (`Symbol`, `UtcDateTime`, `Quote`)
//! - [`source`]: the upstream adapter contract ([`QuoteSource`])
//! - [`adapters`]: concrete provider adapters (Alpha Vantage)
//! - [`fetcher`]: the retrying fetcher with durable fallback
//! - [`history`]: the fallback-store contract ([`QuoteHistory`])
//! - [`events`]: the WebSocket wire protocol
//! - [`trade`]: trade signal derivation

pub mod adapters;
pub mod domain;
pub mod error;
pub mod events;
pub mod fetcher;
pub mod history;
pub mod http_client;
pub mod retry;
pub mod source;
pub mod trade;

pub use domain::{Quote, QuoteOrigin, Symbol, UtcDateTime};
pub use error::{UpstreamError, UpstreamErrorKind, ValidationError};
pub use events::{ClientEvent, QuotePayload, ServerEvent, StockErrorPayload};
pub use fetcher::{FetchPolicy, ResilientFetcher};
pub use history::{FallbackRecord, HistoryError, QuoteHistory};
pub use retry::Backoff;
pub use source::QuoteSource;
pub use trade::{derive_trade_signal, TradeSignal};
