use thiserror::Error;

use quotepulse_store::StoreError;

use crate::config::ConfigError;

/// Fatal startup/runtime errors for the server binary.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("fallback store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
