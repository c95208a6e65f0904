//! Per-connection distribution session.
//!
//! Each WebSocket connection owns one [`StockSession`] running two
//! independent cadences: a quote poll (first push immediately on start)
//! and a keepalive tick. The cadences never merge; a slow quote fetch
//! delays only the next quote tick, never the keepalive.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tracing::debug;
use uuid::Uuid;

use quotepulse_core::{
    Quote, QuotePayload, ResilientFetcher, ServerEvent, StockErrorPayload, Symbol, UtcDateTime,
};

/// Session lifecycle: sessions only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active,
    Terminated,
}

/// Cadence configuration for one session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub symbol: Symbol,
    pub poll_interval: Duration,
    pub keepalive_interval: Duration,
}

/// One connection's push session.
///
/// Events flow through the `outbound` channel; a send after the receiver
/// is gone simply ends the cadence task.
pub struct StockSession {
    id: Uuid,
    config: SessionConfig,
    fetcher: Arc<ResilientFetcher>,
    outbound: mpsc::Sender<ServerEvent>,
    state: Mutex<SessionState>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl StockSession {
    pub fn new(
        config: SessionConfig,
        fetcher: Arc<ResilientFetcher>,
        outbound: mpsc::Sender<ServerEvent>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            fetcher,
            outbound,
            state: Mutex::new(SessionState::Idle),
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock().expect("session state mutex poisoned")
    }

    /// Start both cadences. Only valid from `Idle`; any other state is a
    /// no-op.
    pub fn start(&self) {
        {
            let mut state = self.state.lock().expect("session state mutex poisoned");
            if *state != SessionState::Idle {
                return;
            }
            *state = SessionState::Active;
        }

        let quote_task = self.spawn_quote_cadence();
        let keepalive_task = self.spawn_keepalive_cadence();

        let mut tasks = self.tasks.lock().expect("session task mutex poisoned");
        tasks.push(quote_task);
        tasks.push(keepalive_task);
        debug!(session = %self.id, symbol = %self.config.symbol, "session started");
    }

    fn spawn_quote_cadence(&self) -> JoinHandle<()> {
        let fetcher = Arc::clone(&self.fetcher);
        let symbol = self.config.symbol.clone();
        let outbound = self.outbound.clone();
        let poll_interval = self.config.poll_interval;

        tokio::spawn(async move {
            // First tick fires immediately, so clients see a quote at
            // connect time rather than after one full interval.
            let mut ticker = interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let quote = fetcher.fetch(&symbol).await;
                if outbound.send(cadence_event(&quote)).await.is_err() {
                    break;
                }
            }
        })
    }

    fn spawn_keepalive_cadence(&self) -> JoinHandle<()> {
        let outbound = self.outbound.clone();
        let keepalive_interval = self.config.keepalive_interval;

        tokio::spawn(async move {
            let start = Instant::now() + keepalive_interval;
            let mut ticker = interval_at(start, keepalive_interval);
            loop {
                ticker.tick().await;
                if outbound.send(ServerEvent::Keepalive).await.is_err() {
                    break;
                }
            }
        })
    }

    /// Fetch `symbol` once, out of band, and push the result as a
    /// `stockData` event (or `stockError` on total failure).
    ///
    /// Only valid while `Active`; otherwise a no-op.
    pub async fn request_quote(&self, symbol: Symbol) {
        if self.state() != SessionState::Active {
            return;
        }

        let quote = self.fetcher.fetch(&symbol).await;
        let event = if quote.is_failure() {
            stock_error_event(&quote)
        } else {
            ServerEvent::StockData(QuotePayload::from(&quote))
        };
        let _ = self.outbound.send(event).await;
    }

    /// Cancel both cadences as a unit. Idempotent; after `stop` returns no
    /// cadence fires again.
    pub fn stop(&self) {
        {
            let mut state = self.state.lock().expect("session state mutex poisoned");
            if *state == SessionState::Terminated {
                return;
            }
            *state = SessionState::Terminated;
        }

        let tasks = {
            let mut tasks = self.tasks.lock().expect("session task mutex poisoned");
            std::mem::take(&mut *tasks)
        };
        for task in tasks {
            task.abort();
        }
        debug!(session = %self.id, "session terminated");
    }
}

impl Drop for StockSession {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Map a cadence fetch result to its push event.
fn cadence_event(quote: &Quote) -> ServerEvent {
    if quote.is_failure() {
        stock_error_event(quote)
    } else {
        ServerEvent::StockUpdate(QuotePayload::from(quote))
    }
}

fn stock_error_event(quote: &Quote) -> ServerEvent {
    ServerEvent::StockError(StockErrorPayload {
        symbol: quote.symbol.as_str().to_owned(),
        error: quote
            .failure_reason
            .clone()
            .unwrap_or_else(|| String::from("unknown error")),
        timestamp: UtcDateTime::now().format_rfc3339(),
    })
}
