//! Binds the reconnect controller to a real WebSocket transport.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::{interval_at, timeout, Instant};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use quotepulse_core::{ClientEvent, QuotePayload, ServerEvent, Symbol};

use crate::controller::{DisplayWindow, ReconnectConfig, ReconnectController, ReconnectDirective};
use crate::error::ClientError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Drives a [`ReconnectController`] against live connections.
pub struct QuoteWatcher {
    config: ReconnectConfig,
    controller: ReconnectController,
}

impl QuoteWatcher {
    pub fn new(config: ReconnectConfig) -> Self {
        let controller = ReconnectController::new(&config);
        Self { config, controller }
    }

    pub fn controller(&self) -> &ReconnectController {
        &self.controller
    }

    /// Connect, subscribe to `symbol`, and stream quotes until the
    /// reconnection ceiling is reached.
    ///
    /// `on_quote` fires after each received quote has entered the display
    /// window.
    pub async fn run<F>(&mut self, symbol: &Symbol, mut on_quote: F) -> Result<(), ClientError>
    where
        F: FnMut(&QuotePayload, &DisplayWindow),
    {
        if self.config.endpoints.is_empty() {
            return Err(ClientError::NoEndpoints);
        }

        loop {
            self.controller.connect();
            match self.connect_any().await {
                Ok(stream) => {
                    self.controller.on_connected();
                    info!(%symbol, "connected");
                    self.drive(stream, symbol, &mut on_quote).await;
                    self.controller.on_disconnected("connection closed");
                    warn!(%symbol, "disconnected, retrying");
                }
                Err(error) => {
                    debug!(%error, "connection attempt failed");
                    match self.controller.on_connect_error(&error.to_string()) {
                        ReconnectDirective::RetryAfter(delay) => {
                            tokio::time::sleep(delay).await;
                        }
                        ReconnectDirective::GiveUp => {
                            return Err(ClientError::ReconnectCeilingReached);
                        }
                    }
                }
            }
        }
    }

    /// Try each configured endpoint in order; first success wins.
    async fn connect_any(&self) -> Result<WsStream, ClientError> {
        let mut last_error = ClientError::NoEndpoints;
        for endpoint in &self.config.endpoints {
            match timeout(self.config.connect_timeout, connect_async(endpoint)).await {
                Ok(Ok((stream, _response))) => return Ok(stream),
                Ok(Err(error)) => {
                    debug!(endpoint, %error, "endpoint rejected connection");
                    last_error = ClientError::Transport(error.to_string());
                }
                Err(_) => {
                    debug!(endpoint, "endpoint connect timed out");
                    last_error = ClientError::ConnectTimeout(self.config.connect_timeout);
                }
            }
        }
        Err(last_error)
    }

    async fn drive<F>(&mut self, stream: WsStream, symbol: &Symbol, on_quote: &mut F)
    where
        F: FnMut(&QuotePayload, &DisplayWindow),
    {
        let (mut write, mut read) = stream.split();

        let subscribe = ClientEvent::RequestStock {
            symbol: symbol.to_string(),
        };
        let subscribe_json =
            serde_json::to_string(&subscribe).unwrap_or_else(|_| String::from("{}"));
        if write.send(Message::Text(subscribe_json)).await.is_err() {
            return;
        }

        // First ping after one full interval; only while connected.
        let mut ping = interval_at(
            Instant::now() + self.config.ping_interval,
            self.config.ping_interval,
        );

        loop {
            tokio::select! {
                _ = ping.tick() => {
                    if write.send(Message::Ping(Vec::new())).await.is_err() {
                        break;
                    }
                }
                incoming = read.next() => {
                    match incoming {
                        Some(Ok(Message::Text(text))) => {
                            self.handle_server_text(&text, on_quote);
                        }
                        Some(Ok(Message::Ping(payload))) => {
                            let _ = write.send(Message::Pong(payload)).await;
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Ok(_)) => {}
                        Some(Err(error)) => {
                            warn!(%error, "websocket read failed");
                            break;
                        }
                    }
                }
            }
        }
    }

    fn handle_server_text<F>(&mut self, text: &str, on_quote: &mut F)
    where
        F: FnMut(&QuotePayload, &DisplayWindow),
    {
        let event: ServerEvent = match serde_json::from_str(text) {
            Ok(event) => event,
            Err(error) => {
                debug!(%error, "ignoring unparseable server message");
                return;
            }
        };

        match event {
            ServerEvent::StockUpdate(payload) | ServerEvent::StockData(payload) => {
                self.controller.on_quote(payload.clone());
                on_quote(&payload, self.controller.window());
            }
            ServerEvent::StockError(payload) => {
                warn!(symbol = %payload.symbol, error = %payload.error, "server reported fetch failure");
                self.controller.on_stock_error(&payload.error);
            }
            ServerEvent::Keepalive => {}
        }
    }
}
