//! REST surface and router assembly.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use quotepulse_core::{derive_trade_signal, QuotePayload, Symbol, TradeSignal};

use crate::ws::ws_handler;
use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/stock/:symbol", get(get_stock))
        .route("/trade", post(post_trade))
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

/// `GET /stock/{symbol}`: run the resilient fetcher once.
async fn get_stock(Path(symbol): Path<String>, State(state): State<AppState>) -> Response {
    let symbol = match Symbol::parse(&symbol) {
        Ok(symbol) => symbol,
        Err(error) => return bad_request(&error.to_string()),
    };

    let quote = state.fetcher.fetch(&symbol).await;
    Json(QuotePayload::from(&quote)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct TradeRequest {
    pub symbol: String,
    pub strategy: String,
}

#[derive(Debug, Serialize)]
pub struct TradeResponse {
    pub symbol: String,
    pub price: f64,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "tradeSignal")]
    pub trade_signal: TradeSignal,
    pub cached: bool,
}

/// `POST /trade`: fetch the current price and derive a signal from it.
async fn post_trade(State(state): State<AppState>, Json(request): Json<TradeRequest>) -> Response {
    let symbol = match Symbol::parse(&request.symbol) {
        Ok(symbol) => symbol,
        Err(error) => return bad_request(&error.to_string()),
    };

    let quote = state.fetcher.fetch(&symbol).await;
    let payload = QuotePayload::from(&quote);
    let trade_signal = derive_trade_signal(&request.strategy, quote.price);

    Json(TradeResponse {
        symbol: payload.symbol,
        price: payload.price,
        timestamp: payload.timestamp,
        error: payload.error,
        trade_signal,
        cached: payload.cached,
    })
    .into_response()
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}
