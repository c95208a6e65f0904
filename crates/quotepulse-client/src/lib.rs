//! # quotepulse-client
//!
//! Reconnecting quote watcher. The [`controller`] module is a pure state
//! machine drivable entirely by synthetic events; [`runner`] binds it to a
//! real WebSocket transport.

pub mod controller;
pub mod error;
pub mod runner;

pub use controller::{
    ConnectionStatus, DisplayWindow, ReconnectConfig, ReconnectController, ReconnectDirective,
    RECONNECT_CEILING_MESSAGE,
};
pub use error::ClientError;
pub use runner::QuoteWatcher;
