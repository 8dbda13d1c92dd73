// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA client abstraction.
//!
//! [`UaClient`] is the seam between the application and the OPC UA stack.
//! The stack owns the binary codec, the secure channel, the session state
//! machine and the publish loop. The application only connects, drives
//! bounded iterations and issues subscription requests.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::OpcUaResult;
use crate::types::{ClientSettings, OpcUaDataType, StatusCode, TimestampsToReturn};

use super::discovery::{
    ApplicationDescription, EndpointDescription, FindServersOnNetworkRequest, FindServersRequest,
    ServerOnNetwork,
};
use super::events::ClientEvent;
use super::state::{SecureChannelState, SessionState};
use super::subscription::{
    CreateSubscriptionRequest, CreateSubscriptionResponse, MonitoredItemCreateRequest,
    MonitoredItemCreateResult, SubscriptionId,
};

// =============================================================================
// OpcUaValue
// =============================================================================

/// Decoded variant value.
#[derive(Debug, Clone, PartialEq)]
pub enum OpcUaValue {
    /// Boolean value.
    Boolean(bool),

    /// 32-bit signed integer.
    Int32(i32),

    /// 32-bit unsigned integer.
    UInt32(u32),

    /// 64-bit signed integer.
    Int64(i64),

    /// 64-bit unsigned integer.
    UInt64(u64),

    /// 32-bit float.
    Float(f32),

    /// 64-bit double.
    Double(f64),

    /// String value.
    String(String),

    /// Date/time value.
    DateTime(DateTime<Utc>),

    /// Byte string.
    ByteString(Vec<u8>),

    /// Status code value.
    StatusCode(StatusCode),

    /// Array of values.
    Array(Vec<OpcUaValue>),

    /// Empty variant.
    Null,
}

impl OpcUaValue {
    /// Returns the data type of this value.
    pub fn data_type(&self) -> OpcUaDataType {
        match self {
            Self::Boolean(_) => OpcUaDataType::Boolean,
            Self::Int32(_) => OpcUaDataType::Int32,
            Self::UInt32(_) => OpcUaDataType::UInt32,
            Self::Int64(_) => OpcUaDataType::Int64,
            Self::UInt64(_) => OpcUaDataType::UInt64,
            Self::Float(_) => OpcUaDataType::Float,
            Self::Double(_) => OpcUaDataType::Double,
            Self::String(_) => OpcUaDataType::String,
            Self::DateTime(_) => OpcUaDataType::DateTime,
            Self::ByteString(_) => OpcUaDataType::ByteString,
            Self::StatusCode(_) => OpcUaDataType::StatusCode,
            Self::Array(_) | Self::Null => OpcUaDataType::Variant,
        }
    }

    /// Returns `true` if this is an empty variant.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if this holds exactly one non-empty value.
    #[inline]
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::Array(_) | Self::Null)
    }

    /// Returns `true` if this is a scalar of the given type.
    #[inline]
    pub fn has_scalar_type(&self, data_type: OpcUaDataType) -> bool {
        self.is_scalar() && self.data_type() == data_type
    }

    /// Returns the timestamp if this is a scalar date/time.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::DateTime(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to get the value as an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Boolean(v) => Some(i64::from(*v)),
            Self::Int32(v) => Some(i64::from(*v)),
            Self::UInt32(v) => Some(i64::from(*v)),
            Self::Int64(v) => Some(*v),
            Self::UInt64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Attempts to get the value as a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }
}

impl Default for OpcUaValue {
    fn default() -> Self {
        Self::Null
    }
}

impl fmt::Display for OpcUaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{}", v),
            Self::Int32(v) => write!(f, "{}", v),
            Self::UInt32(v) => write!(f, "{}", v),
            Self::Int64(v) => write!(f, "{}", v),
            Self::UInt64(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "{}", v),
            Self::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
            Self::ByteString(v) => write!(f, "<{} bytes>", v.len()),
            Self::StatusCode(v) => write!(f, "{}", v),
            Self::Array(v) => write!(f, "[{} items]", v.len()),
            Self::Null => write!(f, "null"),
        }
    }
}

// =============================================================================
// DataValue
// =============================================================================

/// A value with its status and timestamps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataValue {
    /// The value, `Null` when the server sent none.
    pub value: OpcUaValue,

    /// Value status.
    pub status: StatusCode,

    /// Timestamp assigned by the data source.
    pub source_timestamp: Option<DateTime<Utc>>,

    /// Timestamp assigned by the server.
    pub server_timestamp: Option<DateTime<Utc>>,
}

impl DataValue {
    /// Creates a good data value without timestamps.
    pub fn new(value: OpcUaValue) -> Self {
        Self {
            value,
            ..Default::default()
        }
    }

    /// Sets the timestamps.
    pub fn with_timestamps(
        mut self,
        source: Option<DateTime<Utc>>,
        server: Option<DateTime<Utc>>,
    ) -> Self {
        self.source_timestamp = source;
        self.server_timestamp = server;
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Returns `true` if the status is good.
    #[inline]
    pub fn is_good(&self) -> bool {
        self.status.is_good()
    }
}

// =============================================================================
// UaClient Trait
// =============================================================================

/// An OPC UA client connection.
///
/// One value owns one connection and its protocol state. All methods are
/// driven from a single task; events are only produced by
/// [`run_iterate`](Self::run_iterate), never concurrently.
///
/// # State changes
///
/// Every change of the channel or session state is reported as one
/// [`ClientEvent::StateChanged`] carrying both states. Changes that happen
/// inside `connect` are queued and returned by the next `run_iterate`, so
/// the handler always sees them in order and before any data change that
/// depends on them.
#[async_trait]
pub trait UaClient: Send + Sync {
    // =========================================================================
    // Connection Management
    // =========================================================================

    /// Returns the client configuration.
    fn settings(&self) -> &ClientSettings;

    /// Returns the current secure channel state.
    fn channel_state(&self) -> SecureChannelState;

    /// Returns the current session state.
    fn session_state(&self) -> SessionState;

    /// Returns the endpoint URL of the open channel, if any.
    fn connected_endpoint(&self) -> Option<&str>;

    /// Returns `true` if a secure channel is open.
    fn is_connected(&self) -> bool {
        self.channel_state().is_open()
    }

    /// Connects to `endpoint` and activates a session.
    ///
    /// Idempotent: returns `Ok` without doing anything when a session is
    /// already activated on this endpoint. Reconnects when the previous
    /// connection closed or failed.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint cannot be reached, the handshake
    /// is rejected or the attempt takes longer than the connect timeout.
    async fn connect(&mut self, endpoint: &str) -> OpcUaResult<()>;

    /// Opens a secure channel to `endpoint` without creating a session.
    ///
    /// Used for discovery services.
    async fn connect_secure_channel(&mut self, endpoint: &str) -> OpcUaResult<()>;

    /// Closes the session and the secure channel.
    ///
    /// Calling this on a closed client is a no-op.
    async fn disconnect(&mut self) -> OpcUaResult<()>;

    // =========================================================================
    // Event Processing
    // =========================================================================

    /// Performs outstanding network I/O for at most `timeout` and returns
    /// the events that became due, in arrival order.
    async fn run_iterate(&mut self, timeout: Duration) -> OpcUaResult<Vec<ClientEvent>>;

    // =========================================================================
    // Services
    // =========================================================================

    /// Sends a GetEndpoints request over the open secure channel.
    async fn get_endpoints(&mut self) -> OpcUaResult<Vec<EndpointDescription>>;

    /// Sends a FindServers request over the open secure channel.
    async fn find_servers(
        &mut self,
        request: &FindServersRequest,
    ) -> OpcUaResult<Vec<ApplicationDescription>>;

    /// Sends a FindServersOnNetwork request over the open secure channel.
    ///
    /// Only discovery servers with multicast support implement this
    /// service; others answer `BadServiceUnsupported`.
    async fn find_servers_on_network(
        &mut self,
        request: &FindServersOnNetworkRequest,
    ) -> OpcUaResult<Vec<ServerOnNetwork>>;

    /// Creates a subscription.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionError::CreationFailed`] with the service result
    /// when the server rejects the request.
    ///
    /// [`SubscriptionError::CreationFailed`]: crate::error::SubscriptionError::CreationFailed
    async fn create_subscription(
        &mut self,
        request: CreateSubscriptionRequest,
    ) -> OpcUaResult<CreateSubscriptionResponse>;

    /// Creates one monitored item in `subscription_id`.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionError::MonitoredItemFailed`] with the operation
    /// status when the server rejects the item.
    ///
    /// [`SubscriptionError::MonitoredItemFailed`]: crate::error::SubscriptionError::MonitoredItemFailed
    async fn create_monitored_item(
        &mut self,
        subscription_id: SubscriptionId,
        timestamps: TimestampsToReturn,
        request: MonitoredItemCreateRequest,
    ) -> OpcUaResult<MonitoredItemCreateResult>;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_scalar_types() {
        let now = Utc::now();
        let value = OpcUaValue::DateTime(now);
        assert!(value.has_scalar_type(OpcUaDataType::DateTime));
        assert_eq!(value.as_datetime(), Some(now));

        assert!(!OpcUaValue::Int64(5).has_scalar_type(OpcUaDataType::DateTime));
        assert!(!OpcUaValue::Array(vec![value.clone()]).is_scalar());
        assert!(!OpcUaValue::Null.is_scalar());
        assert_eq!(OpcUaValue::Array(vec![value]).as_datetime(), None);
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(OpcUaValue::UInt32(7).as_i64(), Some(7));
        assert_eq!(OpcUaValue::UInt64(u64::MAX).as_i64(), None);
        assert_eq!(OpcUaValue::String("x".into()).as_str(), Some("x"));
        assert_eq!(OpcUaValue::default(), OpcUaValue::Null);
        assert_eq!(OpcUaValue::ByteString(vec![1, 2]).to_string(), "<2 bytes>");
    }

    #[test]
    fn test_data_value_builder() {
        let value = DataValue::new(OpcUaValue::Double(1.5))
            .with_status(StatusCode::BAD_TIMEOUT)
            .with_timestamps(None, Some(Utc::now()));
        assert!(!value.is_good());
        assert!(value.server_timestamp.is_some());
        assert!(DataValue::default().is_good());
    }
}
