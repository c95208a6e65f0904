//! Concrete provider adapters.

mod alphavantage;

pub use alphavantage::AlphaVantageSource;
