// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Client events and the handler they are dispatched to.
//!
//! A [`UaClient`](super::UaClient) returns the events that became due from
//! each `run_iterate` call. The caller hands them one at a time, in
//! arrival order, to a single [`EventHandler`]. The handler borrows the
//! client mutably so it can issue requests before the next event is
//! delivered.

use std::fmt;

use async_trait::async_trait;

use super::state::{SecureChannelState, SessionState};
use super::subscription::{DataChangeNotification, SubscriptionId};
use super::transport::UaClient;

// =============================================================================
// ClientEvent
// =============================================================================

/// Something the client observed during an iteration.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// The channel state, the session state or both changed.
    StateChanged {
        /// Secure channel state after the change.
        channel: SecureChannelState,
        /// Session state after the change.
        session: SessionState,
    },

    /// One publish cycle of data changes.
    DataChange(DataChangeNotification),

    /// The server deleted a subscription.
    SubscriptionDeleted {
        /// The deleted subscription.
        subscription_id: SubscriptionId,
    },

    /// A subscription missed its keep-alive.
    SubscriptionInactive {
        /// The inactive subscription.
        subscription_id: SubscriptionId,
    },
}

impl ClientEvent {
    /// Creates a state change event.
    pub fn state_changed(channel: SecureChannelState, session: SessionState) -> Self {
        Self::StateChanged { channel, session }
    }

    /// Returns the event kind for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StateChanged { .. } => "state_changed",
            Self::DataChange(_) => "data_change",
            Self::SubscriptionDeleted { .. } => "subscription_deleted",
            Self::SubscriptionInactive { .. } => "subscription_inactive",
        }
    }
}

impl fmt::Display for ClientEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StateChanged { channel, session } => {
                write!(f, "state changed (channel: {}, session: {})", channel, session)
            }
            Self::DataChange(batch) => write!(
                f,
                "data change (subscription: {}, items: {})",
                batch.subscription_id,
                batch.len()
            ),
            Self::SubscriptionDeleted { subscription_id } => {
                write!(f, "subscription {} deleted", subscription_id)
            }
            Self::SubscriptionInactive { subscription_id } => {
                write!(f, "subscription {} inactive", subscription_id)
            }
        }
    }
}

// =============================================================================
// EventHandler
// =============================================================================

/// Receives every client event.
///
/// Errors are the handler's own business: nothing it does can stop the
/// caller's loop.
#[async_trait]
pub trait EventHandler: Send {
    /// Handles one event. `client` is the client that produced it.
    async fn handle(&mut self, client: &mut dyn UaClient, event: ClientEvent);
}

#[async_trait]
impl<H: EventHandler + ?Sized> EventHandler for Box<H> {
    async fn handle(&mut self, client: &mut dyn UaClient, event: ClientEvent) {
        (**self).handle(client, event).await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_and_display() {
        let event = ClientEvent::state_changed(SecureChannelState::Open, SessionState::Activated);
        assert_eq!(event.kind(), "state_changed");
        assert_eq!(
            event.to_string(),
            "state changed (channel: Open, session: Activated)"
        );

        let event = ClientEvent::SubscriptionDeleted {
            subscription_id: SubscriptionId::new(3),
        };
        assert_eq!(event.to_string(), "subscription 3 deleted");

        let batch = DataChangeNotification::new(SubscriptionId::new(1), Vec::new());
        assert_eq!(ClientEvent::DataChange(batch).kind(), "data_change");
    }
}
