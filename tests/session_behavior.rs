//! Behavior of the per-connection distribution session.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use quotepulse_core::{Backoff, FetchPolicy, ResilientFetcher, ServerEvent};
use quotepulse_server::session::{SessionConfig, SessionState, StockSession};

use quotepulse_tests::{symbol, MemoryHistory, ScriptedSource};

fn fast_policy() -> FetchPolicy {
    FetchPolicy {
        max_attempts: 3,
        backoff: Backoff::Fixed {
            delay: Duration::from_millis(1),
        },
    }
}

fn session_with(
    responses: Vec<Result<f64, quotepulse_core::UpstreamError>>,
    poll_interval: Duration,
    keepalive_interval: Duration,
) -> (Arc<StockSession>, mpsc::Receiver<ServerEvent>) {
    let fetcher = Arc::new(ResilientFetcher::new(
        Arc::new(ScriptedSource::new(responses)),
        Arc::new(MemoryHistory::new()),
        fast_policy(),
    ));
    let config = SessionConfig {
        symbol: symbol("AAPL"),
        poll_interval,
        keepalive_interval,
    };
    let (tx, rx) = mpsc::channel(32);
    (Arc::new(StockSession::new(config, fetcher, tx)), rx)
}

#[tokio::test(start_paused = true)]
async fn when_session_starts_then_first_quote_pushes_immediately() {
    // Given a started session with a one-minute poll cadence
    let (session, mut rx) = session_with(
        vec![Ok(187.45)],
        Duration::from_secs(60),
        Duration::from_secs(25),
    );
    session.start();

    // Then the first stockUpdate arrives without waiting a full interval
    match rx.recv().await.expect("first event") {
        ServerEvent::StockUpdate(payload) => {
            assert_eq!(payload.symbol, "AAPL");
            assert_eq!(payload.price, 187.45);
            assert!(!payload.cached);
        }
        other => panic!("expected stockUpdate, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn when_cadences_run_then_keepalives_interleave_without_merging() {
    // Given 60s quotes and 25s keepalives
    let (session, mut rx) = session_with(
        vec![Ok(100.0), Ok(101.0)],
        Duration::from_secs(60),
        Duration::from_secs(25),
    );
    session.start();

    // Then deadlines order the stream: quote at 0s, keepalives at 25s and
    // 50s, the next quote at 60s
    let mut kinds = Vec::new();
    for _ in 0..4 {
        let event = rx.recv().await.expect("cadence event");
        kinds.push(match event {
            ServerEvent::StockUpdate(payload) => format!("update:{}", payload.price),
            ServerEvent::Keepalive => String::from("keepalive"),
            other => panic!("unexpected event {other:?}"),
        });
    }
    assert_eq!(
        kinds,
        vec!["update:100", "keepalive", "keepalive", "update:101"]
    );
}

#[tokio::test(start_paused = true)]
async fn when_session_stops_then_no_further_cadence_fires() {
    let (session, mut rx) = session_with(
        vec![Ok(100.0), Ok(101.0), Ok(102.0)],
        Duration::from_secs(60),
        Duration::from_secs(25),
    );
    session.start();
    let _ = rx.recv().await.expect("initial update");

    session.stop();
    // Stopping again is a no-op
    session.stop();
    assert_eq!(session.state(), SessionState::Terminated);

    drop(session);
    assert!(rx.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn when_quote_is_requested_out_of_band_then_a_distinct_stock_data_event_pushes() {
    let (session, mut rx) = session_with(
        vec![Ok(187.45), Ok(512.30)],
        Duration::from_secs(60),
        Duration::from_secs(25),
    );
    session.start();
    let _ = rx.recv().await.expect("initial update");

    // When asking for another symbol mid-session
    session.request_quote(symbol("NVDA")).await;

    // Then the answer is a stockData event, not a cadence stockUpdate
    match rx.recv().await.expect("pull answer") {
        ServerEvent::StockData(payload) => {
            assert_eq!(payload.symbol, "NVDA");
            assert_eq!(payload.price, 512.30);
        }
        other => panic!("expected stockData, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn when_quote_is_requested_after_stop_then_nothing_is_pushed() {
    let (session, mut rx) = session_with(
        vec![Ok(100.0), Ok(200.0)],
        Duration::from_secs(60),
        Duration::from_secs(25),
    );
    session.start();
    let _ = rx.recv().await.expect("initial update");
    session.stop();

    session.request_quote(symbol("NVDA")).await;

    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test(start_paused = true)]
async fn when_every_attempt_fails_with_no_cache_then_cadence_pushes_stock_error() {
    let (session, mut rx) = session_with(
        vec![
            Err(quotepulse_core::UpstreamError::Transport(String::from(
                "upstream down",
            ))),
            Err(quotepulse_core::UpstreamError::Transport(String::from(
                "upstream down",
            ))),
            Err(quotepulse_core::UpstreamError::Transport(String::from(
                "upstream down",
            ))),
        ],
        Duration::from_secs(60),
        Duration::from_secs(25),
    );
    session.start();

    match rx.recv().await.expect("first event") {
        ServerEvent::StockError(payload) => {
            assert_eq!(payload.symbol, "AAPL");
            assert!(payload.error.contains("after 3 attempts"));
        }
        other => panic!("expected stockError, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn session_state_only_moves_forward() {
    let (session, mut rx) = session_with(
        vec![Ok(100.0)],
        Duration::from_secs(60),
        Duration::from_secs(25),
    );
    assert_eq!(session.state(), SessionState::Idle);

    session.start();
    assert_eq!(session.state(), SessionState::Active);
    let _ = rx.recv().await;

    session.stop();
    assert_eq!(session.state(), SessionState::Terminated);

    // Restarting a terminated session stays terminated
    session.start();
    assert_eq!(session.state(), SessionState::Terminated);
}
