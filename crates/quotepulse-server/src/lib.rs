//! # quotepulse-server
//!
//! axum-based distribution server: REST quote/trade endpoints plus a
//! WebSocket surface that runs one [`session::StockSession`] per
//! connection.

pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod ws;

use std::sync::Arc;

use quotepulse_core::ResilientFetcher;

use config::ServerConfig;

/// Shared per-request application state.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<ResilientFetcher>,
    pub config: ServerConfig,
}
