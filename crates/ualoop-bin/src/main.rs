// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! ualoop - resilient OPC UA client
//!
//! Connects to a server, follows its current time and reconnects whenever
//! the connection is lost. Stops cleanly on Ctrl-C.

use ualoop_bin::error::report_error_and_exit;
use ualoop_bin::{app, init_logging, load_settings, BinResult, ShutdownCoordinator};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        report_error_and_exit(e);
    }
}

async fn run() -> BinResult<()> {
    let settings = load_settings()?;
    init_logging(&settings.log_level, settings.log_format)?;

    let coordinator = ShutdownCoordinator::new();
    coordinator.spawn_signal_listener();

    app::run(&settings, coordinator.token()).await?;
    Ok(())
}
