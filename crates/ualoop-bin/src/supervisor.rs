// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Connection supervision.
//!
//! The supervisor drives one client until shutdown is requested:
//!
//! ```text
//!   ┌──────────────► shutdown? ── yes ──► disconnect, report
//!   │                   │ no
//!   │                connect ── err ──► pause retry_pause ──┐
//!   │                   │ ok                      ▲         │
//!   │            run_iterate(timeout) ── err ─────┘         │
//!   │                   │                                   │
//!   │      handler.handle(event) for each event             │
//!   └───────────────────┴───────────────────────────────────┘
//! ```
//!
//! Connect is idempotent, so calling it every pass is how lost
//! connections get re-established. The shutdown flag is checked between
//! calls; an in-flight connect or iterate is never cancelled.

use std::fmt;
use std::time::Duration;

use tracing::{debug, info, Instrument};
use uuid::Uuid;

use ualoop_opcua::{EventHandler, UaClient};

use crate::config::AppSettings;
use crate::shutdown::ShutdownToken;

// =============================================================================
// SupervisorSettings
// =============================================================================

/// Loop parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorSettings {
    /// Endpoint to connect to.
    pub endpoint: String,

    /// Pause after a failed connect.
    pub retry_pause: Duration,

    /// Bound on one iteration.
    pub iterate_timeout: Duration,
}

impl SupervisorSettings {
    /// Creates settings with the default one-second pause and timeout.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            retry_pause: Duration::from_secs(1),
            iterate_timeout: Duration::from_secs(1),
        }
    }
}

impl From<&AppSettings> for SupervisorSettings {
    fn from(settings: &AppSettings) -> Self {
        Self {
            endpoint: settings.client.endpoint.clone(),
            retry_pause: settings.retry_pause,
            iterate_timeout: settings.iterate_timeout,
        }
    }
}

// =============================================================================
// SupervisorReport
// =============================================================================

/// Counters of one supervisor run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupervisorReport {
    /// Connect calls made.
    pub connect_attempts: u64,

    /// Connect calls that failed.
    pub connect_failures: u64,

    /// Iterations run.
    pub iterations: u64,

    /// Iterations that returned an error.
    pub iterate_failures: u64,

    /// Events handed to the handler.
    pub events_dispatched: u64,
}

impl fmt::Display for SupervisorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} connect attempts ({} failed), {} iterations ({} failed), {} events",
            self.connect_attempts,
            self.connect_failures,
            self.iterations,
            self.iterate_failures,
            self.events_dispatched
        )
    }
}

// =============================================================================
// Supervisor
// =============================================================================

/// Keeps a client connected and feeds its events to a handler.
pub struct Supervisor<C, H> {
    client: C,
    handler: H,
    settings: SupervisorSettings,
    shutdown: ShutdownToken,
}

impl<C, H> Supervisor<C, H>
where
    C: UaClient,
    H: EventHandler,
{
    /// Creates a supervisor.
    pub fn new(client: C, handler: H, settings: SupervisorSettings, shutdown: ShutdownToken) -> Self {
        Self {
            client,
            handler,
            settings,
            shutdown,
        }
    }

    /// Returns the client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Returns the client mutably.
    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    /// Returns the handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Consumes the supervisor, returning the client and the handler.
    pub fn into_parts(self) -> (C, H) {
        (self.client, self.handler)
    }

    /// Runs until shutdown is requested, then disconnects once.
    pub async fn run(&mut self) -> SupervisorReport {
        let span = tracing::info_span!(
            "supervisor",
            run_id = %Uuid::new_v4(),
            endpoint = %self.settings.endpoint
        );

        async {
            let mut report = SupervisorReport::default();

            while !self.shutdown.is_shutdown_requested() {
                report.connect_attempts += 1;
                if let Err(e) = self.client.connect(&self.settings.endpoint).await {
                    report.connect_failures += 1;
                    e.log("connect");
                    info!(
                        "Not connected. Retrying to connect in {}",
                        humantime::format_duration(self.settings.retry_pause)
                    );
                    tokio::time::sleep(self.settings.retry_pause).await;
                    continue;
                }

                report.iterations += 1;
                let events = match self.client.run_iterate(self.settings.iterate_timeout).await {
                    Ok(events) => events,
                    Err(e) => {
                        report.iterate_failures += 1;
                        e.log("iterate");
                        // A backend may fail without waiting out the timeout.
                        tokio::time::sleep(self.settings.retry_pause).await;
                        continue;
                    }
                };

                for event in events {
                    debug!(kind = event.kind(), "Dispatching {}", event);
                    report.events_dispatched += 1;
                    self.handler.handle(&mut self.client, event).await;
                }
            }

            info!("Shutdown requested, disconnecting");
            if let Err(e) = self.client.disconnect().await {
                e.log("disconnect");
            }

            report
        }
        .instrument(span)
        .await
    }
}

impl<C, H> fmt::Debug for Supervisor<C, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("settings", &self.settings)
            .field("shutdown_requested", &self.shutdown.is_shutdown_requested())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
