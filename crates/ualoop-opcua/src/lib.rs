// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA client layer for ualoop.
//!
//! This crate defines what the ualoop application needs from an OPC UA
//! stack and nothing more: connect, drive bounded iterations, create
//! subscriptions and monitored items, and receive the resulting events.
//! The binary codec, secure channel and publish protocol stay inside the
//! stack (the `opcua` crate behind the `real-transport` feature).
//!
//! # Error Handling
//!
//! ```text
//! OpcUaError
//! ├── Connection    - Secure channel and endpoint issues
//! ├── Subscription  - Subscription and monitoring errors
//! ├── Discovery     - GetEndpoints / FindServers / FindServersOnNetwork
//! ├── Configuration - Invalid settings
//! └── Timeout       - Connect attempts that ran out of time
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use ualoop_opcua::{ClientSettings, RealUaClient, UaClient};
//!
//! let mut client = RealUaClient::new(ClientSettings::default());
//! client.connect("opc.tcp://localhost:4840").await?;
//! for event in client.run_iterate(Duration::from_secs(1)).await? {
//!     println!("{event}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{
    ConfigurationError, ConnectionError, DiscoveryError, DiscoveryService, ErrorCode,
    ErrorSeverity, OpcUaError, OpcUaResult, SubscriptionError, TimeoutError,
};

pub use types::{
    AttributeId, ClientSettings, ClientSettingsBuilder, MonitoredItemSettings, MonitoringMode,
    NodeId, NodeIdentifier, OpcUaDataType, SecurityMode, StatusCode, SubscriptionSettings,
    TimestampsToReturn, DEFAULT_ENDPOINT,
};

// Re-export client types
pub use client::{
    discover_endpoints, find_servers, find_servers_on_network, ApplicationDescription,
    ApplicationType, ClientEvent, ClientHandle, CreateSubscriptionRequest,
    CreateSubscriptionResponse, DataChangeNotification, DataValue, DateTimeParts,
    EndpointDescription, EventHandler, FindServersOnNetworkRequest, FindServersRequest,
    ServerOnNetwork, MonitoredItemCreateRequest, MonitoredItemCreateResult,
    MonitoredItemId, MonitoredItemNotification, OpcUaValue, SecureChannelState, SessionState,
    SubscriptionId, UaClient,
};

// Re-export real client when feature is enabled
#[cfg(feature = "real-transport")]
pub use client::RealUaClient;
