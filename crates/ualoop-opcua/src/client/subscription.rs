// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Subscription and monitored item requests, results and notifications.
//!
//! The subscription/publish protocol itself belongs to the client backend.
//! This module only carries what crosses the [`UaClient`] boundary:
//!
//! ```text
//! CreateSubscriptionRequest ──► create_subscription ──► CreateSubscriptionResponse
//!                                                            │ subscription_id
//!                                                            ▼
//! MonitoredItemCreateRequest ─► create_monitored_item ─► MonitoredItemCreateResult
//!
//! publish cycle ──► DataChangeNotification { items: [MonitoredItemNotification] }
//! ```
//!
//! [`UaClient`]: super::UaClient

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{AttributeId, MonitoredItemSettings, MonitoringMode, NodeId, StatusCode, SubscriptionSettings};

use super::transport::DataValue;

// =============================================================================
// IDs
// =============================================================================

/// Server-assigned subscription identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u32);

impl SubscriptionId {
    /// Creates a new subscription ID.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SubscriptionId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Server-assigned monitored item identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonitoredItemId(pub u32);

impl MonitoredItemId {
    /// Creates a new monitored item ID.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for MonitoredItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for MonitoredItemId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Application-assigned handle that the server echoes in every
/// notification of a monitored item.
pub type ClientHandle = u32;

// =============================================================================
// Subscription Requests
// =============================================================================

/// Parameters of a CreateSubscription request.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSubscriptionRequest {
    /// Requested publishing interval.
    pub requested_publishing_interval: Duration,
    /// Requested lifetime count.
    pub requested_lifetime_count: u32,
    /// Requested max keep-alive count.
    pub requested_max_keep_alive_count: u32,
    /// Maximum notifications per publish, 0 for unlimited.
    pub max_notifications_per_publish: u32,
    /// Whether publishing starts enabled.
    pub publishing_enabled: bool,
    /// Relative priority.
    pub priority: u8,
}

impl CreateSubscriptionRequest {
    /// Builds a request from subscription settings.
    pub fn from_settings(settings: &SubscriptionSettings) -> Self {
        Self {
            requested_publishing_interval: settings.publishing_interval,
            requested_lifetime_count: settings.lifetime_count,
            requested_max_keep_alive_count: settings.keepalive_count,
            max_notifications_per_publish: settings.max_notifications_per_publish,
            publishing_enabled: settings.publishing_enabled,
            priority: settings.priority,
        }
    }
}

impl Default for CreateSubscriptionRequest {
    fn default() -> Self {
        Self::from_settings(&SubscriptionSettings::default())
    }
}

/// Successful CreateSubscription response with the server-revised values.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSubscriptionResponse {
    /// Assigned subscription ID.
    pub subscription_id: SubscriptionId,
    /// Publishing interval granted by the server.
    pub revised_publishing_interval: Duration,
    /// Lifetime count granted by the server.
    pub revised_lifetime_count: u32,
    /// Keep-alive count granted by the server.
    pub revised_max_keep_alive_count: u32,
}

impl CreateSubscriptionResponse {
    /// Creates a response that grants the request unchanged.
    pub fn granted(subscription_id: SubscriptionId, request: &CreateSubscriptionRequest) -> Self {
        Self {
            subscription_id,
            revised_publishing_interval: request.requested_publishing_interval,
            revised_lifetime_count: request.requested_lifetime_count,
            revised_max_keep_alive_count: request.requested_max_keep_alive_count,
        }
    }
}

// =============================================================================
// Monitored Item Requests
// =============================================================================

/// Node and attribute to monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadValueId {
    /// Target node.
    pub node_id: NodeId,
    /// Target attribute.
    pub attribute_id: AttributeId,
}

/// Sampling parameters for a monitored item.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoringParameters {
    /// Handle echoed back in notifications.
    pub client_handle: ClientHandle,
    /// Requested sampling interval.
    pub sampling_interval: Duration,
    /// Server-side queue size.
    pub queue_size: u32,
    /// Discard the oldest queued value on overflow.
    pub discard_oldest: bool,
}

/// Parameters of a CreateMonitoredItems request for one item.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoredItemCreateRequest {
    /// What to monitor.
    pub item_to_monitor: ReadValueId,
    /// Monitoring mode.
    pub monitoring_mode: MonitoringMode,
    /// Requested parameters.
    pub requested_parameters: MonitoringParameters,
}

impl MonitoredItemCreateRequest {
    /// Creates a request for the value attribute of `node_id` with default
    /// monitored item settings and client handle 0.
    pub fn new(node_id: NodeId) -> Self {
        Self::from_settings(node_id, &MonitoredItemSettings::default())
    }

    /// Creates a request for the value attribute of `node_id`.
    pub fn from_settings(node_id: NodeId, settings: &MonitoredItemSettings) -> Self {
        Self {
            item_to_monitor: ReadValueId {
                node_id,
                attribute_id: AttributeId::Value,
            },
            monitoring_mode: settings.monitoring_mode,
            requested_parameters: MonitoringParameters {
                client_handle: 0,
                sampling_interval: settings.sampling_interval,
                queue_size: settings.queue_size,
                discard_oldest: settings.discard_oldest,
            },
        }
    }

    /// Overrides the client handle.
    pub fn with_client_handle(mut self, client_handle: ClientHandle) -> Self {
        self.requested_parameters.client_handle = client_handle;
        self
    }

    /// Returns the client handle.
    #[inline]
    pub fn client_handle(&self) -> ClientHandle {
        self.requested_parameters.client_handle
    }

    /// Returns the monitored node.
    #[inline]
    pub fn node_id(&self) -> &NodeId {
        &self.item_to_monitor.node_id
    }
}

/// Successful result of creating one monitored item.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoredItemCreateResult {
    /// Operation status.
    pub status_code: StatusCode,
    /// Assigned monitored item ID.
    pub monitored_item_id: MonitoredItemId,
    /// Sampling interval granted by the server.
    pub revised_sampling_interval: Duration,
    /// Queue size granted by the server.
    pub revised_queue_size: u32,
}

impl MonitoredItemCreateResult {
    /// Creates a good result that grants the request unchanged.
    pub fn granted(monitored_item_id: MonitoredItemId, request: &MonitoredItemCreateRequest) -> Self {
        Self {
            status_code: StatusCode::GOOD,
            monitored_item_id,
            revised_sampling_interval: request.requested_parameters.sampling_interval,
            revised_queue_size: request.requested_parameters.queue_size,
        }
    }
}

// =============================================================================
// Notifications
// =============================================================================

/// One changed monitored item within a publish cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoredItemNotification {
    /// Handle assigned when the item was created.
    pub client_handle: ClientHandle,
    /// The new value.
    pub value: DataValue,
}

impl MonitoredItemNotification {
    /// Creates a new notification.
    pub fn new(client_handle: ClientHandle, value: DataValue) -> Self {
        Self {
            client_handle,
            value,
        }
    }
}

/// All data changes of one subscription delivered by one publish cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct DataChangeNotification {
    /// Subscription that produced the batch.
    pub subscription_id: SubscriptionId,
    /// Changed items, in server order.
    pub items: Vec<MonitoredItemNotification>,
}

impl DataChangeNotification {
    /// Creates a new batch.
    pub fn new(subscription_id: SubscriptionId, items: Vec<MonitoredItemNotification>) -> Self {
        Self {
            subscription_id,
            items,
        }
    }

    /// Returns the number of items in the batch.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the batch is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the items carrying `client_handle`.
    pub fn items_for(&self, client_handle: ClientHandle) -> impl Iterator<Item = &MonitoredItemNotification> {
        self.items
            .iter()
            .filter(move |item| item.client_handle == client_handle)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::OpcUaValue;

    #[test]
    fn test_default_subscription_request() {
        let request = CreateSubscriptionRequest::default();
        assert_eq!(request.requested_publishing_interval, Duration::from_millis(500));
        assert_eq!(request.requested_lifetime_count, 10_000);
        assert_eq!(request.requested_max_keep_alive_count, 10);
        assert_eq!(request.max_notifications_per_publish, 0);
        assert_eq!(request.priority, 0);
        assert!(request.publishing_enabled);
    }

    #[test]
    fn test_monitored_item_request_client_handle() {
        let request = MonitoredItemCreateRequest::new(NodeId::SERVER_STATUS_CURRENT_TIME);
        assert_eq!(request.client_handle(), 0);
        assert_eq!(request.item_to_monitor.attribute_id, AttributeId::Value);

        let request = request.with_client_handle(42);
        assert_eq!(request.client_handle(), 42);
        assert_eq!(request.node_id(), &NodeId::SERVER_STATUS_CURRENT_TIME);
        assert_eq!(request.requested_parameters.queue_size, 1);
    }

    #[test]
    fn test_granted_results() {
        let request = CreateSubscriptionRequest::default();
        let response = CreateSubscriptionResponse::granted(SubscriptionId::new(7), &request);
        assert_eq!(response.subscription_id.value(), 7);
        assert_eq!(response.revised_lifetime_count, 10_000);

        let item = MonitoredItemCreateRequest::new(NodeId::SERVER_STATUS_CURRENT_TIME);
        let result = MonitoredItemCreateResult::granted(MonitoredItemId::new(3), &item);
        assert!(result.status_code.is_good());
        assert_eq!(result.revised_sampling_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_notification_filter_by_handle() {
        let batch = DataChangeNotification::new(
            SubscriptionId::new(1),
            vec![
                MonitoredItemNotification::new(1, DataValue::new(OpcUaValue::Int32(5))),
                MonitoredItemNotification::new(42, DataValue::new(OpcUaValue::Null)),
                MonitoredItemNotification::new(2, DataValue::new(OpcUaValue::Boolean(true))),
            ],
        );
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.items_for(42).count(), 1);
        assert_eq!(batch.items_for(99).count(), 0);
        assert_eq!(SubscriptionId::new(5).to_string(), "5");
    }
}
