//! Pure reconnection state machine and quote display window.
//!
//! No I/O lives here: the controller advances only through typed events,
//! so tests can drive every transition synthetically and the runner stays
//! a thin transport binding.

use std::collections::VecDeque;
use std::time::Duration;

use quotepulse_core::QuotePayload;

/// Error surfaced when the automatic reconnection ceiling is reached.
pub const RECONNECT_CEILING_MESSAGE: &str =
    "Maximum reconnection attempts reached. Please reconnect manually.";

/// Connection lifecycle as seen by the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

/// What the transport loop should do after a connect error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDirective {
    /// Wait the fixed inter-attempt delay, then try again.
    RetryAfter(Duration),
    /// Ceiling reached; stop until a manual reconnect.
    GiveUp,
}

/// Reconnection policy plus transport endpoints.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Endpoint URLs tried in order on every connection attempt.
    pub endpoints: Vec<String>,
    pub max_reconnect_attempts: u32,
    /// Fixed delay between attempts; reconnection does not back off.
    pub reconnect_delay: Duration,
    pub connect_timeout: Duration,
    pub ping_interval: Duration,
    pub window_capacity: usize,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            endpoints: vec![String::from("ws://127.0.0.1:9000/ws")],
            max_reconnect_attempts: 5,
            reconnect_delay: Duration::from_millis(1_000),
            connect_timeout: Duration::from_secs(10),
            ping_interval: Duration::from_secs(25),
            window_capacity: 10,
        }
    }
}

/// Bounded FIFO of the most recent quotes, oldest first.
#[derive(Debug, Clone)]
pub struct DisplayWindow {
    capacity: usize,
    entries: VecDeque<QuotePayload>,
}

impl DisplayWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
        }
    }

    /// Append a quote, evicting the oldest entry at capacity.
    pub fn push(&mut self, payload: QuotePayload) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(payload);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuotePayload> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&QuotePayload> {
        self.entries.back()
    }
}

/// Connection state machine with bounded automatic reconnection.
#[derive(Debug)]
pub struct ReconnectController {
    max_reconnect_attempts: u32,
    reconnect_delay: Duration,
    status: ConnectionStatus,
    reconnect_attempts: u32,
    terminal: bool,
    last_error: Option<String>,
    window: DisplayWindow,
}

impl ReconnectController {
    pub fn new(config: &ReconnectConfig) -> Self {
        Self {
            max_reconnect_attempts: config.max_reconnect_attempts,
            reconnect_delay: config.reconnect_delay,
            status: ConnectionStatus::Disconnected,
            reconnect_attempts: 0,
            terminal: false,
            last_error: None,
            window: DisplayWindow::new(config.window_capacity),
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts
    }

    /// True once the ceiling was reached; only [`manual_reconnect`]
    /// clears it.
    ///
    /// [`manual_reconnect`]: Self::manual_reconnect
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn window(&self) -> &DisplayWindow {
        &self.window
    }

    /// Begin an automatic connection attempt. No-op when already connected
    /// or when the terminal ceiling is in force.
    pub fn connect(&mut self) {
        if self.terminal || self.status == ConnectionStatus::Connected {
            return;
        }
        self.status = ConnectionStatus::Connecting;
    }

    /// The transport established a connection.
    pub fn on_connected(&mut self) {
        self.status = ConnectionStatus::Connected;
        self.reconnect_attempts = 0;
        self.last_error = None;
    }

    /// A connection attempt failed. Returns what the transport should do
    /// next.
    pub fn on_connect_error(&mut self, message: &str) -> ReconnectDirective {
        self.reconnect_attempts += 1;
        if self.reconnect_attempts >= self.max_reconnect_attempts {
            self.status = ConnectionStatus::Disconnected;
            self.terminal = true;
            self.last_error = Some(String::from(RECONNECT_CEILING_MESSAGE));
            return ReconnectDirective::GiveUp;
        }

        self.status = ConnectionStatus::Connecting;
        self.last_error = Some(message.to_owned());
        ReconnectDirective::RetryAfter(self.reconnect_delay)
    }

    /// An established connection dropped. Not terminal; the transport may
    /// keep retrying within the attempt budget.
    pub fn on_disconnected(&mut self, reason: &str) {
        if self.terminal {
            return;
        }
        self.status = ConnectionStatus::Disconnected;
        self.last_error = Some(reason.to_owned());
    }

    /// A quote arrived (cadence push or pull answer).
    pub fn on_quote(&mut self, payload: QuotePayload) {
        self.window.push(payload);
    }

    /// A `stockError` push arrived; the connection itself stays up.
    pub fn on_stock_error(&mut self, message: &str) {
        self.last_error = Some(message.to_owned());
    }

    /// User-initiated restart: always allowed, clears the terminal state
    /// and the attempt counter, and starts connecting again.
    pub fn manual_reconnect(&mut self) {
        self.terminal = false;
        self.reconnect_attempts = 0;
        self.last_error = None;
        self.status = ConnectionStatus::Connecting;
    }
}
