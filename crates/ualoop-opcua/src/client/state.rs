// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Secure channel and session states.
//!
//! A client reports both states together whenever either of them changes.
//! The channel goes through the HEL/ACK and OPN handshakes before it is
//! open; the session is created and activated on top of an open channel.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// SecureChannelState
// =============================================================================

/// State of the secure channel to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SecureChannelState {
    /// No channel.
    #[default]
    Closed,

    /// TCP connection is being established.
    Connecting,

    /// HEL message sent, waiting for ACK.
    HelSent,

    /// ACK received.
    AckReceived,

    /// OpenSecureChannel request sent, waiting for the response.
    OpnSent,

    /// Channel is open.
    Open,

    /// Channel is being closed.
    Closing,
}

impl SecureChannelState {
    /// Returns `true` if the channel is open.
    #[inline]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns `true` if the channel is in a handshake or closing step.
    #[inline]
    pub fn is_transitioning(&self) -> bool {
        matches!(
            self,
            Self::Connecting | Self::HelSent | Self::AckReceived | Self::OpnSent | Self::Closing
        )
    }
}

impl fmt::Display for SecureChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "Closed"),
            Self::Connecting => write!(f, "Connecting"),
            Self::HelSent => write!(f, "HelSent"),
            Self::AckReceived => write!(f, "AckReceived"),
            Self::OpnSent => write!(f, "OpnSent"),
            Self::Open => write!(f, "Open"),
            Self::Closing => write!(f, "Closing"),
        }
    }
}

// =============================================================================
// SessionState
// =============================================================================

/// State of the OPC UA session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No session.
    #[default]
    Closed,

    /// CreateSession request sent.
    CreateRequested,

    /// Session created but not activated.
    Created,

    /// ActivateSession request sent.
    ActivateRequested,

    /// Session is active and ready for use.
    Activated,

    /// Session is being closed.
    Closing,
}

impl SessionState {
    /// Returns `true` if the session is activated.
    #[inline]
    pub fn is_activated(&self) -> bool {
        matches!(self, Self::Activated)
    }

    /// Returns `true` if the session is in a transitional state.
    #[inline]
    pub fn is_transitioning(&self) -> bool {
        matches!(
            self,
            Self::CreateRequested | Self::ActivateRequested | Self::Closing
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "Closed"),
            Self::CreateRequested => write!(f, "CreateRequested"),
            Self::Created => write!(f, "Created"),
            Self::ActivateRequested => write!(f, "ActivateRequested"),
            Self::Activated => write!(f, "Activated"),
            Self::Closing => write!(f, "Closing"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_closed() {
        assert_eq!(SecureChannelState::default(), SecureChannelState::Closed);
        assert_eq!(SessionState::default(), SessionState::Closed);
    }

    #[test]
    fn test_state_predicates() {
        assert!(SecureChannelState::Open.is_open());
        assert!(SecureChannelState::HelSent.is_transitioning());
        assert!(!SecureChannelState::Closed.is_transitioning());

        assert!(SessionState::Activated.is_activated());
        assert!(SessionState::ActivateRequested.is_transitioning());
        assert!(!SessionState::Created.is_activated());
    }

    #[test]
    fn test_display() {
        assert_eq!(SecureChannelState::OpnSent.to_string(), "OpnSent");
        assert_eq!(SessionState::Activated.to_string(), "Activated");
    }
}
