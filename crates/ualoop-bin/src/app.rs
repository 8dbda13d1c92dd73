// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application wiring.
//!
//! Builds the watcher and the supervisor from [`AppSettings`] and runs
//! them against a client until shutdown.

use tracing::{info, warn};

use ualoop_opcua::{discover_endpoints, UaClient};

use crate::config::AppSettings;
use crate::error::BinResult;
use crate::observer::CurrentTimeWatcher;
use crate::shutdown::ShutdownToken;
use crate::supervisor::{Supervisor, SupervisorReport, SupervisorSettings};

/// Runs the application with the compiled-in client backend.
///
/// # Errors
///
/// Fails without the `real-transport` feature, since there is no client
/// to run.
#[cfg(feature = "real-transport")]
pub async fn run(settings: &AppSettings, shutdown: ShutdownToken) -> BinResult<SupervisorReport> {
    let client = ualoop_opcua::RealUaClient::new(settings.client.clone());
    run_with_client(client, settings, shutdown).await
}

/// Runs the application with the compiled-in client backend.
///
/// # Errors
///
/// Fails without the `real-transport` feature, since there is no client
/// to run.
#[cfg(not(feature = "real-transport"))]
pub async fn run(_settings: &AppSettings, _shutdown: ShutdownToken) -> BinResult<SupervisorReport> {
    Err(crate::error::BinError::init(
        "no client backend compiled in (enable the `real-transport` feature)",
    ))
}

/// Runs the application with `client` until shutdown is requested.
pub async fn run_with_client<C>(
    mut client: C,
    settings: &AppSettings,
    shutdown: ShutdownToken,
) -> BinResult<SupervisorReport>
where
    C: UaClient,
{
    info!(
        version = crate::VERSION,
        endpoint = %settings.client.endpoint,
        "Starting ualoop"
    );

    if settings.discover_endpoints_on_start {
        log_endpoints(&mut client, &settings.client.endpoint).await;
    }

    let watcher = CurrentTimeWatcher::new(&settings.client)?;
    let mut supervisor = Supervisor::new(
        client,
        watcher,
        SupervisorSettings::from(settings),
        shutdown,
    );

    let report = supervisor.run().await;
    info!(%report, "ualoop stopped");

    Ok(report)
}

async fn log_endpoints(client: &mut dyn UaClient, endpoint: &str) {
    match discover_endpoints(client, endpoint).await {
        Ok(endpoints) => {
            info!(count = endpoints.len(), "Server offers {} endpoints", endpoints.len());
            for endpoint in &endpoints {
                info!(
                    security_mode = %endpoint.security_mode,
                    security_level = endpoint.security_level,
                    "Endpoint {}",
                    endpoint
                );
            }
        }
        Err(e) => {
            e.log("discover endpoints");
            warn!("Endpoint discovery failed, continuing");
        }
    }
}
