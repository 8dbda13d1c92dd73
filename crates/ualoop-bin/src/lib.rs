// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # ualoop-bin
//!
//! Binary for the ualoop OPC UA client.
//!
//! The binary keeps one client connected to a server, subscribes to the
//! server's current time on every session activation and logs each
//! reported value until it receives a termination signal.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         main.rs                             │
//! │        (settings, logging, signal listener, app::run)       │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │
//!                    ┌──────▼──────┐        ┌─────────────┐
//!                    │ supervisor  │◄───────┤  shutdown   │
//!                    │ (connect /  │  flag  │ (signals)   │
//!                    │  iterate)   │        └─────────────┘
//!                    └──────┬──────┘
//!                           │ ClientEvent
//!                    ┌──────▼──────┐
//!                    │  observer   │──► create subscription
//!                    │             │──► create monitored item
//!                    └──────┬──────┘
//!                           │ DataChange
//!                    ┌──────▼──────┐
//!                    │  dispatch   │──► "date is: DD-MM-YYYY ..."
//!                    └─────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Connect to opc.tcp://localhost:4840
//! ualoop
//!
//! # Another server, JSON logs
//! UALOOP_ENDPOINT=opc.tcp://plc.local:4840 UALOOP_LOG_FORMAT=json ualoop
//!
//! # Settings file
//! UALOOP_CONFIG=/etc/ualoop.yaml ualoop
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod app;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod observer;
pub mod shutdown;
pub mod supervisor;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{load_settings, load_settings_from, AppSettings};
pub use dispatch::{CurrentTimeLog, NotificationDispatcher, CURRENT_TIME_CLIENT_HANDLE};
pub use error::{BinError, BinResult};
pub use logging::{init_logging, LogFormat};
pub use observer::CurrentTimeWatcher;
pub use shutdown::{ShutdownCoordinator, ShutdownToken};
pub use supervisor::{Supervisor, SupervisorReport, SupervisorSettings};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
