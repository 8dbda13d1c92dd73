// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA client abstraction and event model.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 application loop (ualoop-bin)                   │
//! │        connect ─► run_iterate ─► EventHandler::handle           │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         UaClient                                │
//! │     (connection, iteration, subscription services)             │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │            RealUaClient (`opcua` crate) or test doubles         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod conversion;
mod discovery;
mod events;
mod state;
pub mod subscription;
mod transport;

#[cfg(feature = "real-transport")]
mod real_transport;

pub use conversion::{datetime_to_ua_ticks, ua_ticks_to_datetime, DateTimeParts};
pub use discovery::{
    discover_endpoints, find_servers, find_servers_on_network, ApplicationDescription,
    ApplicationType, EndpointDescription, FindServersOnNetworkRequest, FindServersRequest,
    ServerOnNetwork, SECURITY_POLICY_URI_PREFIX,
};
pub use events::{ClientEvent, EventHandler};
pub use state::{SecureChannelState, SessionState};
pub use subscription::{
    ClientHandle, CreateSubscriptionRequest, CreateSubscriptionResponse, DataChangeNotification,
    MonitoredItemCreateRequest, MonitoredItemCreateResult, MonitoredItemId,
    MonitoredItemNotification, MonitoringParameters, ReadValueId, SubscriptionId,
};
pub use transport::{DataValue, OpcUaValue, UaClient};

#[cfg(feature = "real-transport")]
pub use real_transport::RealUaClient;
