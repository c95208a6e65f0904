use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use quotepulse_core::adapters::AlphaVantageSource;
use quotepulse_core::http_client::ReqwestHttpClient;
use quotepulse_core::{FetchPolicy, ResilientFetcher};
use quotepulse_server::config::ServerConfig;
use quotepulse_server::error::ServerError;
use quotepulse_server::routes::router;
use quotepulse_server::AppState;
use quotepulse_store::{FallbackStore, StoreConfig};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(%error, "server failed");
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quotepulse_server=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run() -> Result<(), ServerError> {
    let config = ServerConfig::from_env()?;

    let store = FallbackStore::open(StoreConfig::new(config.db_path.clone()))?;
    let source = Arc::new(AlphaVantageSource::new(
        Arc::new(ReqwestHttpClient::new()),
        config.api_key.clone(),
    ));
    let fetcher = Arc::new(ResilientFetcher::new(
        source,
        Arc::new(store),
        FetchPolicy::default(),
    ));

    let state = AppState {
        fetcher,
        config: config.clone(),
    };
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(
        port = config.port,
        symbol = %config.default_symbol,
        db = %config.db_path.display(),
        "quotepulse server listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
