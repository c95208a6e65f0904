//! WebSocket glue between the axum socket and a [`StockSession`].

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use quotepulse_core::{ClientEvent, ServerEvent, StockErrorPayload, Symbol, UtcDateTime};

use crate::session::StockSession;
use crate::AppState;

const OUTBOUND_BUFFER: usize = 32;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    symbol: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, params))
}

async fn handle_socket(mut socket: WebSocket, state: AppState, params: WsParams) {
    let symbol = match params.symbol.as_deref() {
        Some(raw) => match Symbol::parse(raw) {
            Ok(symbol) => symbol,
            Err(error) => {
                let event = invalid_symbol_event(raw, &error.to_string());
                let _ = socket.send(to_message(&event)).await;
                let _ = socket.send(Message::Close(None)).await;
                return;
            }
        },
        None => state.config.default_symbol.clone(),
    };

    let (outbound, mut events) = mpsc::channel::<ServerEvent>(OUTBOUND_BUFFER);
    let session = Arc::new(StockSession::new(
        state.config.session_config(symbol),
        Arc::clone(&state.fetcher),
        outbound.clone(),
    ));
    session.start();
    debug!(session = %session.id(), "websocket connected");

    loop {
        tokio::select! {
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else {
                    break;
                };
                let message = match event {
                    // Keepalive rides as a bare ping frame, no payload.
                    ServerEvent::Keepalive => Message::Ping(Vec::new()),
                    other => to_message(&other),
                };
                if socket.send(message).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        handle_client_text(&text, &session, &outbound).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(error)) => {
                        warn!(session = %session.id(), %error, "websocket receive failed");
                        break;
                    }
                }
            }
        }
    }

    session.stop();
    debug!(session = %session.id(), "websocket closed");
}

async fn handle_client_text(
    text: &str,
    session: &Arc<StockSession>,
    outbound: &mpsc::Sender<ServerEvent>,
) {
    let event: ClientEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(error) => {
            debug!(%error, "ignoring unparseable client message");
            return;
        }
    };

    match event {
        ClientEvent::RequestStock { symbol } => match Symbol::parse(&symbol) {
            Ok(parsed) => {
                // Run out of band so a slow fetch does not stall the
                // writer loop or the cadences.
                let session = Arc::clone(session);
                tokio::spawn(async move {
                    session.request_quote(parsed).await;
                });
            }
            Err(error) => {
                let _ = outbound
                    .send(invalid_symbol_event(&symbol, &error.to_string()))
                    .await;
            }
        },
        ClientEvent::Ping => {
            // Transport-level pings are answered by the socket layer;
            // nothing to do for the typed variant.
        }
    }
}

fn invalid_symbol_event(raw: &str, error: &str) -> ServerEvent {
    ServerEvent::StockError(StockErrorPayload {
        symbol: raw.to_owned(),
        error: error.to_owned(),
        timestamp: UtcDateTime::now().format_rfc3339(),
    })
}

fn to_message(event: &ServerEvent) -> Message {
    Message::Text(serde_json::to_string(event).unwrap_or_else(|_| String::from("{}")))
}
