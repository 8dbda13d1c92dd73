// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Builders
//!
//! Short constructors for client events and notification batches.

use chrono::{DateTime, TimeZone, Utc};

use ualoop_opcua::{
    ClientEvent, ClientHandle, DataChangeNotification, DataValue, MonitoredItemNotification,
    OpcUaValue, SecureChannelState, SessionState, SubscriptionId,
};

// =============================================================================
// State Events
// =============================================================================

/// Channel open, session activated.
pub fn activated() -> ClientEvent {
    ClientEvent::state_changed(SecureChannelState::Open, SessionState::Activated)
}

/// Channel and session closed.
pub fn disconnected() -> ClientEvent {
    ClientEvent::state_changed(SecureChannelState::Closed, SessionState::Closed)
}

/// Channel open, no session.
pub fn channel_open() -> ClientEvent {
    ClientEvent::state_changed(SecureChannelState::Open, SessionState::Closed)
}

/// Any channel and session state.
pub fn state(channel: SecureChannelState, session: SessionState) -> ClientEvent {
    ClientEvent::state_changed(channel, session)
}

/// The server deleted `subscription_id`.
pub fn subscription_deleted(subscription_id: u32) -> ClientEvent {
    ClientEvent::SubscriptionDeleted {
        subscription_id: SubscriptionId::new(subscription_id),
    }
}

/// `subscription_id` missed its keep-alive.
pub fn subscription_inactive(subscription_id: u32) -> ClientEvent {
    ClientEvent::SubscriptionInactive {
        subscription_id: SubscriptionId::new(subscription_id),
    }
}

// =============================================================================
// Data Changes
// =============================================================================

/// Builds one publish batch.
#[derive(Debug, Clone)]
pub struct BatchBuilder {
    subscription_id: SubscriptionId,
    items: Vec<MonitoredItemNotification>,
}

impl BatchBuilder {
    /// Starts a batch for `subscription_id`.
    pub fn new(subscription_id: u32) -> Self {
        Self {
            subscription_id: SubscriptionId::new(subscription_id),
            items: Vec::new(),
        }
    }

    /// Adds an item.
    pub fn item(mut self, client_handle: ClientHandle, value: OpcUaValue) -> Self {
        self.items
            .push(MonitoredItemNotification::new(client_handle, DataValue::new(value)));
        self
    }

    /// Adds `count` integer items with handles starting at `first_handle`.
    pub fn filler(mut self, first_handle: ClientHandle, count: u32) -> Self {
        for i in 0..count {
            self = self.item(first_handle + i, OpcUaValue::UInt32(i));
        }
        self
    }

    /// Returns the notification.
    pub fn build(self) -> DataChangeNotification {
        DataChangeNotification::new(self.subscription_id, self.items)
    }

    /// Returns the notification as a client event.
    pub fn event(self) -> ClientEvent {
        ClientEvent::DataChange(self.build())
    }
}

/// A fixed timestamp: 2024-03-09 07:05:02.123 UTC.
pub fn sample_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 2)
        .single()
        .map(|t| t + chrono::Duration::milliseconds(123))
        .unwrap_or_default()
}
