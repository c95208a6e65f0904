use std::time::Duration;

use thiserror::Error;

/// Client-side transport and lifecycle errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no endpoints configured")]
    NoEndpoints,

    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("websocket transport error: {0}")]
    Transport(String),

    #[error("Maximum reconnection attempts reached. Please reconnect manually.")]
    ReconnectCeilingReached,
}
