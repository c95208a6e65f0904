//! Behavior of the client reconnection state machine, driven synthetically.

use std::time::Duration;

use quotepulse_client::{
    ConnectionStatus, ReconnectConfig, ReconnectController, ReconnectDirective,
    RECONNECT_CEILING_MESSAGE,
};
use quotepulse_core::QuotePayload;

fn payload(symbol: &str, price: f64) -> QuotePayload {
    QuotePayload {
        symbol: symbol.to_owned(),
        price,
        timestamp: String::from("2026-02-20T10:00:00Z"),
        error: None,
        cached: false,
    }
}

#[test]
fn when_attempts_reach_the_ceiling_then_controller_goes_terminal() {
    // Given the default policy of five attempts with a fixed 1s delay
    let mut controller = ReconnectController::new(&ReconnectConfig::default());
    controller.connect();

    // When the first four attempts fail
    for attempt in 1..=4 {
        let directive = controller.on_connect_error("connection refused");
        assert_eq!(
            directive,
            ReconnectDirective::RetryAfter(Duration::from_millis(1_000)),
            "attempt {attempt} should retry after the fixed delay"
        );
        assert_eq!(controller.status(), ConnectionStatus::Connecting);
    }

    // Then the fifth failure gives up with the terminal message
    let directive = controller.on_connect_error("connection refused");
    assert_eq!(directive, ReconnectDirective::GiveUp);
    assert_eq!(controller.status(), ConnectionStatus::Disconnected);
    assert!(controller.is_terminal());
    assert_eq!(controller.last_error(), Some(RECONNECT_CEILING_MESSAGE));

    // And automatic reconnection is refused until manual intervention
    controller.connect();
    assert_eq!(controller.status(), ConnectionStatus::Disconnected);
}

#[test]
fn when_user_reconnects_manually_then_ceiling_resets_and_connecting_resumes() {
    // Given a controller driven to its terminal state
    let mut controller = ReconnectController::new(&ReconnectConfig::default());
    controller.connect();
    for _ in 0..5 {
        let _ = controller.on_connect_error("connection refused");
    }
    assert!(controller.is_terminal());

    // When the user restarts explicitly
    controller.manual_reconnect();

    // Then the counter and terminal flag clear and attempts begin anew
    assert!(!controller.is_terminal());
    assert_eq!(controller.reconnect_attempts(), 0);
    assert_eq!(controller.status(), ConnectionStatus::Connecting);
    assert_eq!(
        controller.on_connect_error("still down"),
        ReconnectDirective::RetryAfter(Duration::from_millis(1_000))
    );
}

#[test]
fn when_an_established_connection_drops_then_state_is_not_terminal() {
    let mut controller = ReconnectController::new(&ReconnectConfig::default());
    controller.connect();
    controller.on_connected();

    controller.on_disconnected("connection closed");

    assert_eq!(controller.status(), ConnectionStatus::Disconnected);
    assert!(!controller.is_terminal());
    assert_eq!(controller.last_error(), Some("connection closed"));
}

#[test]
fn when_connection_succeeds_mid_sequence_then_attempt_budget_is_restored() {
    let mut controller = ReconnectController::new(&ReconnectConfig::default());
    controller.connect();
    for _ in 0..4 {
        let _ = controller.on_connect_error("refused");
    }
    assert_eq!(controller.reconnect_attempts(), 4);

    controller.on_connected();
    assert_eq!(controller.reconnect_attempts(), 0);

    // A fresh run of failures gets the full budget again
    controller.on_disconnected("connection closed");
    controller.connect();
    assert_eq!(
        controller.on_connect_error("refused"),
        ReconnectDirective::RetryAfter(Duration::from_millis(1_000))
    );
    assert!(!controller.is_terminal());
}

#[test]
fn display_window_keeps_only_the_ten_most_recent_quotes_in_arrival_order() {
    let mut controller = ReconnectController::new(&ReconnectConfig::default());
    controller.connect();
    controller.on_connected();

    for i in 0..12 {
        controller.on_quote(payload("AAPL", 100.0 + i as f64));
    }

    let window = controller.window();
    assert_eq!(window.len(), 10);
    let prices: Vec<f64> = window.iter().map(|p| p.price).collect();
    assert_eq!(prices.first(), Some(&102.0));
    assert_eq!(prices.last(), Some(&111.0));
}

#[test]
fn defaults_match_the_published_policy() {
    let config = ReconnectConfig::default();
    assert_eq!(config.max_reconnect_attempts, 5);
    assert_eq!(config.reconnect_delay, Duration::from_millis(1_000));
    assert_eq!(config.connect_timeout, Duration::from_secs(10));
    assert_eq!(config.ping_interval, Duration::from_secs(25));
    assert_eq!(config.window_capacity, 10);
}
