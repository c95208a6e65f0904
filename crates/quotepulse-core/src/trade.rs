//! Trade signal derivation for the `/trade` endpoint.

use serde::{Deserialize, Serialize};

/// Buy/Sell recommendation derived from a strategy and a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSignal {
    Buy,
    Sell,
}

/// Derive a signal: the `simple` strategy buys under 100.0, everything
/// else sells.
pub fn derive_trade_signal(strategy: &str, price: f64) -> TradeSignal {
    if strategy == "simple" && price < 100.0 {
        TradeSignal::Buy
    } else {
        TradeSignal::Sell
    }
}
