// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # ualoop Integration Tests
//!
//! Test support for driving the supervisor and the state observer without
//! a server, plus the cross-crate integration suites.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `mocks`: [`ScriptedClient`](common::mocks::ScriptedClient), a
//!     `UaClient` that follows a script and records every call
//!   - `builders`: Constructors for client events and notification batches
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all integration tests
//! cargo test -p ualoop-tests
//!
//! # Run specific test suite
//! cargo test -p ualoop-tests --test integration_supervisor
//! cargo test -p ualoop-tests --test integration_observer
//! cargo test -p ualoop-tests --test integration_discovery
//! ```
//!
//! ## Writing New Tests
//!
//! ```rust,ignore
//! use ualoop_tests::prelude::*;
//!
//! #[tokio::test(start_paused = true)]
//! async fn test_something() {
//!     let shutdown = ShutdownToken::new();
//!     let client = ScriptedClient::new()
//!         .fail_connects(2)
//!         .stop_after_iterations(1, shutdown.clone());
//!     let calls = client.call_log();
//!     // ... run a Supervisor, then inspect `calls`
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::builders::*;
    pub use crate::common::mocks::*;
    pub use ualoop_bin::ShutdownToken;
}
