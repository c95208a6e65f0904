use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use quotepulse_client::{ClientError, QuoteWatcher, ReconnectConfig};
use quotepulse_core::Symbol;

/// Stream live quotes from a quotepulse server.
#[derive(Debug, Parser)]
#[command(name = "quotepulse-watch", version, about)]
struct Args {
    /// Server WebSocket endpoint; repeat for ordered fallback.
    #[arg(long, default_value = "ws://127.0.0.1:9000/ws")]
    url: Vec<String>,

    /// Symbol to watch.
    #[arg(long, default_value = "AAPL")]
    symbol: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quotepulse_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let symbol = match Symbol::parse(&args.symbol) {
        Ok(symbol) => symbol,
        Err(error) => {
            eprintln!("error: {error}");
            return ExitCode::FAILURE;
        }
    };

    let config = ReconnectConfig {
        endpoints: args.url,
        ..ReconnectConfig::default()
    };
    let mut watcher = QuoteWatcher::new(config);

    let outcome = tokio::select! {
        result = watcher.run(&symbol, |payload, _window| {
            let marker = if payload.cached { " (cached)" } else { "" };
            println!(
                "{:<8} {:>10.2}  {}{}",
                payload.symbol, payload.price, payload.timestamp, marker
            );
        }) => result,
        _ = tokio::signal::ctrl_c() => Ok(()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err @ ClientError::ReconnectCeilingReached) => {
            error!("{err}");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
        Err(err) => {
            error!(%err, "watcher failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
