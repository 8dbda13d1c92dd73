// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Shutdown signalling.
//!
//! The running flag is a single atomic boolean. The signal listener is the
//! only concurrent writer; it sets the flag and touches nothing else. The
//! supervisor reads it through a [`ShutdownToken`] between client calls.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

// =============================================================================
// ShutdownCoordinator
// =============================================================================

/// Owns the running flag and turns OS signals into a shutdown request.
///
/// # Example
///
/// ```ignore
/// use ualoop_bin::shutdown::ShutdownCoordinator;
///
/// let coordinator = ShutdownCoordinator::new();
/// let token = coordinator.token();
/// coordinator.spawn_signal_listener();
///
/// while !token.is_shutdown_requested() {
///     // one bounded step
/// }
/// ```
#[derive(Clone, Debug, Default)]
pub struct ShutdownCoordinator {
    shutdown_initiated: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    /// Creates a new coordinator with the flag cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a token observing this coordinator's flag.
    pub fn token(&self) -> ShutdownToken {
        ShutdownToken::from_coordinator(self)
    }

    /// Sets the flag. Only the first call logs.
    pub fn initiate_shutdown(&self) {
        if self
            .shutdown_initiated
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!("Shutdown initiated");
        }
    }

    /// Returns true if shutdown has been initiated.
    pub fn is_shutdown_initiated(&self) -> bool {
        self.shutdown_initiated.load(Ordering::SeqCst)
    }

    /// Waits for the first termination signal and initiates shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if a signal handler cannot be installed. The flag
    /// is left untouched in that case.
    pub async fn wait_for_shutdown(&self) -> io::Result<()> {
        if self.is_shutdown_initiated() {
            return Ok(());
        }

        let signal = wait_for_signal().await?;
        info!(signal, "Received {}", signal);
        self.initiate_shutdown();
        Ok(())
    }

    /// Spawns a task running [`wait_for_shutdown`](Self::wait_for_shutdown).
    pub fn spawn_signal_listener(&self) -> JoinHandle<()> {
        let coordinator = self.clone();
        tokio::spawn(async move {
            if let Err(e) = coordinator.wait_for_shutdown().await {
                error!(error = %e, "Failed to install signal handlers");
            }
        })
    }
}

/// Waits for SIGINT, SIGTERM or SIGQUIT and returns the signal name.
#[cfg(unix)]
async fn wait_for_signal() -> io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigquit = signal(SignalKind::quit())?;

    let name = tokio::select! {
        _ = sigint.recv() => "Ctrl-C",
        _ = sigterm.recv() => "SIGTERM",
        _ = sigquit.recv() => "SIGQUIT",
    };
    Ok(name)
}

/// Waits for Ctrl-C and returns the signal name.
#[cfg(not(unix))]
async fn wait_for_signal() -> io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl-C")
}

// =============================================================================
// ShutdownToken
// =============================================================================

/// A cloneable handle on the running flag.
#[derive(Clone, Debug, Default)]
pub struct ShutdownToken {
    shutdown_initiated: Arc<AtomicBool>,
}

impl ShutdownToken {
    /// Creates a standalone token, not tied to any signal listener.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a token sharing the coordinator's flag.
    pub fn from_coordinator(coordinator: &ShutdownCoordinator) -> Self {
        Self {
            shutdown_initiated: coordinator.shutdown_initiated.clone(),
        }
    }

    /// Returns true if shutdown has been requested.
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_initiated.load(Ordering::SeqCst)
    }

    /// Requests shutdown.
    pub fn request_shutdown(&self) {
        self.shutdown_initiated.store(true, Ordering::SeqCst);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_token() {
        let coordinator = ShutdownCoordinator::new();
        let token = coordinator.token();

        assert!(!token.is_shutdown_requested());

        coordinator.initiate_shutdown();

        assert!(token.is_shutdown_requested());
        assert!(coordinator.is_shutdown_initiated());
    }

    #[test]
    fn test_token_clones_share_flag() {
        let token = ShutdownToken::new();
        let clone = token.clone();

        clone.request_shutdown();

        assert!(token.is_shutdown_requested());
    }

    #[test]
    fn test_double_shutdown() {
        let coordinator = ShutdownCoordinator::new();

        coordinator.initiate_shutdown();
        coordinator.initiate_shutdown();

        assert!(coordinator.is_shutdown_initiated());
    }

    #[tokio::test]
    async fn test_wait_returns_immediately_when_initiated() {
        let coordinator = ShutdownCoordinator::new();
        coordinator.initiate_shutdown();

        tokio::time::timeout(std::time::Duration::from_secs(1), coordinator.wait_for_shutdown())
            .await
            .expect("should not wait for a signal")
            .expect("no handler needed");
    }
}
