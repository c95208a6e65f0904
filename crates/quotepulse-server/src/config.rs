//! Environment-driven server configuration.
//!
//! All variables are prefixed `QUOTEPULSE_` and fall back to sensible
//! defaults so a bare `quotepulse-server` starts against the Alpha Vantage
//! demo key.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use quotepulse_core::{Symbol, ValidationError};

use crate::session::SessionConfig;

const DEFAULT_PORT: u16 = 9000;
const DEFAULT_SYMBOL: &str = "AAPL";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
const DEFAULT_KEEPALIVE_INTERVAL_SECS: u64 = 25;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name}: '{value}'")]
    InvalidNumber { name: &'static str, value: String },

    #[error(transparent)]
    InvalidSymbol(#[from] ValidationError),
}

/// Server runtime configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Symbol streamed to connections that do not request one.
    pub default_symbol: Symbol,
    pub api_key: String,
    pub db_path: PathBuf,
    pub poll_interval: Duration,
    pub keepalive_interval: Duration,
}

impl ServerConfig {
    /// Read configuration from `QUOTEPULSE_*` environment variables.
    ///
    /// # Errors
    /// Returns an error when a variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port: u16 = parse_env_number("QUOTEPULSE_PORT", DEFAULT_PORT)?;
        let default_symbol = Symbol::parse(
            &env::var("QUOTEPULSE_SYMBOL").unwrap_or_else(|_| String::from(DEFAULT_SYMBOL)),
        )?;
        let api_key = env::var("QUOTEPULSE_ALPHAVANTAGE_API_KEY")
            .or_else(|_| env::var("ALPHAVANTAGE_API_KEY"))
            .unwrap_or_else(|_| String::from("demo"));
        let db_path = env::var("QUOTEPULSE_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_db_path());
        let poll_interval = Duration::from_secs(parse_env_number(
            "QUOTEPULSE_POLL_INTERVAL_SECS",
            DEFAULT_POLL_INTERVAL_SECS,
        )?);
        let keepalive_interval = Duration::from_secs(parse_env_number(
            "QUOTEPULSE_KEEPALIVE_INTERVAL_SECS",
            DEFAULT_KEEPALIVE_INTERVAL_SECS,
        )?);

        Ok(Self {
            port,
            default_symbol,
            api_key,
            db_path,
            poll_interval,
            keepalive_interval,
        })
    }

    /// Session cadences for one connection streaming `symbol`.
    pub fn session_config(&self, symbol: Symbol) -> SessionConfig {
        SessionConfig {
            symbol,
            poll_interval: self.poll_interval,
            keepalive_interval: self.keepalive_interval,
        }
    }
}

fn parse_env_number<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => parse_number(name, &raw),
        Err(_) => Ok(default),
    }
}

/// Parse within the target type so out-of-range values are rejected, never
/// wrapped.
fn parse_number<T: FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: raw.to_owned(),
    })
}

fn default_db_path() -> PathBuf {
    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".quotepulse").join("quotes.duckdb");
    }
    PathBuf::from(".quotepulse").join("quotes.duckdb")
}
