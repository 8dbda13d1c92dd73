// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Supervisor Integration Tests
//!
//! Drives the connection supervisor with a scripted client and the
//! current-time watcher:
//!
//! - `test_retry_*`: connect and iterate failures and the retry pause
//! - `test_shutdown_*`: loop termination and the final disconnect
//! - `test_app_*`: the full application wiring

use std::time::Duration;

use tokio::time::Instant;

use ualoop_bin::app::run_with_client;
use ualoop_bin::{AppSettings, CurrentTimeWatcher, Supervisor, SupervisorSettings};
use ualoop_opcua::{ClientSettings, EndpointDescription, OpcUaValue, StatusCode};
use ualoop_tests::common::init_test_logging;
use ualoop_tests::prelude::*;

const ENDPOINT: &str = "opc.tcp://localhost:4840";

fn supervisor(
    client: ScriptedClient,
    shutdown: &ShutdownToken,
) -> Supervisor<ScriptedClient, CurrentTimeWatcher> {
    let watcher = CurrentTimeWatcher::new(&ClientSettings::default()).unwrap();
    Supervisor::new(
        client,
        watcher,
        SupervisorSettings::new(ENDPOINT),
        shutdown.clone(),
    )
}

// =============================================================================
// Retry Tests
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_retry_three_failures_then_success() {
    init_test_logging();
    let shutdown = ShutdownToken::new();
    let client = ScriptedClient::new()
        .fail_connects(3)
        .stop_after_iterations(1, shutdown.clone());
    let calls = client.call_log();

    let start = Instant::now();
    let report = supervisor(client, &shutdown).run().await;

    assert_eq!(start.elapsed(), Duration::from_secs(3));
    assert_eq!(report.connect_attempts, 4);
    assert_eq!(report.connect_failures, 3);
    assert_eq!(report.iterations, 1);

    let first_iterate = calls
        .position(|c| matches!(c, Call::Iterate(_)))
        .expect("iterate was called");
    assert_eq!(first_iterate, 4);
    assert!(calls.calls()[..4]
        .iter()
        .all(|c| *c == Call::Connect(ENDPOINT.to_string())));
}

#[tokio::test(start_paused = true)]
async fn test_retry_never_gives_up() {
    let shutdown = ShutdownToken::new();
    let client = ScriptedClient::new()
        .fail_connects(25)
        .stop_after_iterations(1, shutdown.clone());

    let start = Instant::now();
    let report = supervisor(client, &shutdown).run().await;

    assert_eq!(report.connect_failures, 25);
    assert_eq!(report.iterations, 1);
    assert_eq!(start.elapsed(), Duration::from_secs(25));
}

#[tokio::test(start_paused = true)]
async fn test_retry_timeout_treated_as_failure() {
    let shutdown = ShutdownToken::new();
    let client = ScriptedClient::new()
        .time_out_connect(Duration::from_secs(1))
        .stop_after_iterations(1, shutdown.clone());

    let start = Instant::now();
    let report = supervisor(client, &shutdown).run().await;

    assert_eq!(report.connect_failures, 1);
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_retry_uses_configured_pause_and_timeout() {
    let shutdown = ShutdownToken::new();
    let client = ScriptedClient::new()
        .fail_connects(2)
        .stop_after_iterations(1, shutdown.clone());
    let calls = client.call_log();

    let watcher = CurrentTimeWatcher::new(&ClientSettings::default()).unwrap();
    let settings = SupervisorSettings {
        endpoint: ENDPOINT.to_string(),
        retry_pause: Duration::from_millis(250),
        iterate_timeout: Duration::from_millis(100),
    };
    let mut supervisor = Supervisor::new(client, watcher, settings, shutdown);

    let start = Instant::now();
    supervisor.run().await;

    assert_eq!(start.elapsed(), Duration::from_millis(500));
    assert!(calls
        .calls()
        .contains(&Call::Iterate(Duration::from_millis(100))));
}

#[tokio::test(start_paused = true)]
async fn test_retry_pauses_after_iterate_failure() {
    let shutdown = ShutdownToken::new();
    let client = ScriptedClient::new()
        .fail_iterations(2)
        .stop_after_iterations(3, shutdown.clone());
    let calls = client.call_log();

    let start = Instant::now();
    let report = supervisor(client, &shutdown).run().await;

    // failing iterations return at once; only the pauses take time
    assert_eq!(start.elapsed(), Duration::from_secs(2));
    assert_eq!(report.iterations, 3);
    assert_eq!(report.iterate_failures, 2);
    assert_eq!(report.connect_failures, 0);
    assert_eq!(calls.iterations(), 3);
    // the activation queued by the first connect is still delivered
    assert_eq!(calls.subscription_requests(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_retry_reconnects_after_loss() {
    let shutdown = ShutdownToken::new();
    let client = ScriptedClient::new()
        .lose_connection_after_iteration(1)
        .stop_after_iterations(3, shutdown.clone());
    let calls = client.call_log();

    let mut supervisor = supervisor(client, &shutdown);
    let report = supervisor.run().await;

    assert_eq!(report.connect_attempts, 3);
    assert_eq!(report.connect_failures, 0);
    // one subscription per activation
    assert_eq!(calls.subscription_requests(), 2);
    assert_eq!(
        supervisor.handler().active_subscription(),
        Some(ualoop_opcua::SubscriptionId::new(2))
    );
}

// =============================================================================
// Shutdown Tests
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_shutdown_already_requested() {
    let shutdown = ShutdownToken::new();
    shutdown.request_shutdown();
    let client = ScriptedClient::new();
    let calls = client.call_log();

    let report = supervisor(client, &shutdown).run().await;

    assert_eq!(report.connect_attempts, 0);
    assert_eq!(calls.calls(), vec![Call::Disconnect]);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_disconnects_exactly_once() {
    let shutdown = ShutdownToken::new();
    let client = ScriptedClient::new().stop_after_iterations(5, shutdown.clone());
    let calls = client.call_log();

    let (client, watcher) = {
        let mut supervisor = supervisor(client, &shutdown);
        let report = supervisor.run().await;
        assert_eq!(report.iterations, 5);
        supervisor.into_parts()
    };

    assert_eq!(calls.disconnects(), 1);
    assert_eq!(calls.calls().last(), Some(&Call::Disconnect));
    assert_eq!(calls.iterations(), 5);
    assert!(!ualoop_opcua::UaClient::is_connected(&client));
    assert!(watcher.active_subscription().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_during_retry_pause() {
    let shutdown = ShutdownToken::new();
    let client = ScriptedClient::new().fail_connects(100);
    let calls = client.call_log();

    let stopper = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        stopper.request_shutdown();
    });

    let start = Instant::now();
    let report = supervisor(client, &shutdown).run().await;

    // flag set during the third pause; no further attempt afterwards
    assert_eq!(report.connect_attempts, 3);
    assert_eq!(start.elapsed(), Duration::from_secs(3));
    assert_eq!(calls.disconnects(), 1);
    assert_eq!(calls.iterations(), 0);
}

// =============================================================================
// Application Tests
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_app_discovers_then_runs() {
    init_test_logging();
    let shutdown = ShutdownToken::new();
    let client = ScriptedClient::new()
        .with_endpoints(vec![EndpointDescription::unsecured(ENDPOINT)])
        .on_iteration(vec![BatchBuilder::new(1)
            .item(42, OpcUaValue::DateTime(sample_time()))
            .event()])
        .stop_after_iterations(1, shutdown.clone());
    let calls = client.call_log();

    let mut settings = AppSettings::default();
    settings.discover_endpoints_on_start = true;

    let report = run_with_client(client, &settings, shutdown).await.unwrap();

    let recorded = calls.calls();
    assert_eq!(recorded[0], Call::ConnectSecureChannel(ENDPOINT.to_string()));
    assert_eq!(recorded[1], Call::GetEndpoints);
    assert_eq!(recorded[2], Call::Disconnect);
    assert_eq!(recorded[3], Call::Connect(ENDPOINT.to_string()));
    assert_eq!(calls.subscription_requests(), 1);
    assert_eq!(calls.monitored_item_requests().len(), 1);
    assert_eq!(calls.disconnects(), 2);

    // discovery's open and close, the activation, then the scripted batch
    assert_eq!(report.events_dispatched, 4);
}

#[tokio::test(start_paused = true)]
async fn test_app_discovery_failure_not_fatal() {
    let shutdown = ShutdownToken::new();
    let client = ScriptedClient::new()
        .fail_get_endpoints(StatusCode::BAD_SERVICE_UNSUPPORTED)
        .stop_after_iterations(1, shutdown.clone());
    let calls = client.call_log();

    let mut settings = AppSettings::default();
    settings.discover_endpoints_on_start = true;

    let report = run_with_client(client, &settings, shutdown).await.unwrap();

    assert_eq!(report.iterations, 1);
    assert_eq!(calls.subscription_requests(), 1);
}
