// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA domain types and client configuration.
//!
//! - **NodeId**: The four OPC UA node identifier types with parsing
//! - **StatusCode**: Service and operation results with symbolic names
//! - **OpcUaDataType**: Built-in data types for value interpretation
//! - **TimestampsToReturn / MonitoringMode / AttributeId**: Request enums
//! - **ClientSettings**: Client configuration with builder and validation
//! - **SubscriptionSettings / MonitoredItemSettings**: Request defaults
//!
//! # Examples
//!
//! ```
//! use ualoop_opcua::types::{ClientSettings, NodeId};
//!
//! let node_id: NodeId = "ns=0;i=2258".parse().unwrap();
//! assert_eq!(node_id, NodeId::SERVER_STATUS_CURRENT_TIME);
//!
//! let settings = ClientSettings::builder()
//!     .endpoint("opc.tcp://localhost:4840")
//!     .build()
//!     .unwrap();
//! assert_eq!(settings.endpoint, "opc.tcp://localhost:4840");
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ConfigurationError, OpcUaError};

/// Default endpoint of a local OPC UA server.
pub const DEFAULT_ENDPOINT: &str = "opc.tcp://localhost:4840";

// =============================================================================
// NodeId
// =============================================================================

/// OPC UA Node Identifier.
///
/// A NodeId uniquely identifies a node within an OPC UA server.
/// It consists of a namespace index and an identifier which can be
/// numeric, string, GUID, or opaque (byte string).
///
/// # Examples
///
/// ```
/// use ualoop_opcua::types::NodeId;
///
/// let numeric = NodeId::numeric(0, 2258);
/// let parsed: NodeId = "ns=2;s=MyDevice.Temperature".parse().unwrap();
/// assert_eq!(parsed.to_string(), "ns=2;s=MyDevice.Temperature");
/// assert_eq!(numeric.to_string(), "ns=0;i=2258");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId {
    /// Namespace index (0 = OPC UA standard namespace).
    pub namespace_index: u16,

    /// The node identifier.
    pub identifier: NodeIdentifier,
}

impl NodeId {
    /// Server_ServerStatus_CurrentTime (ns=0, i=2258).
    pub const SERVER_STATUS_CURRENT_TIME: NodeId = NodeId::numeric(0, 2258);

    /// Creates a numeric node ID.
    #[inline]
    pub const fn numeric(namespace_index: u16, value: u32) -> Self {
        Self {
            namespace_index,
            identifier: NodeIdentifier::Numeric(value),
        }
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::numeric(0, 0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ns={};{}", self.namespace_index, self.identifier)
    }
}

impl FromStr for NodeId {
    type Err = OpcUaError;

    /// Parses a NodeId from OPC UA string format.
    ///
    /// Supported formats:
    /// - `ns=0;i=2258` (numeric)
    /// - `ns=2;s=MyNode` (string)
    /// - `ns=2;g=550e8400-e29b-41d4-a716-446655440000` (GUID)
    /// - `ns=2;b=SGVsbG8=` (opaque, base64 encoded)
    /// - `i=2258` (namespace 0)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |reason: String| {
            OpcUaError::configuration(ConfigurationError::invalid_node_id(s, reason))
        };

        let (namespace_index, identifier_part) = match s.strip_prefix("ns=") {
            Some(rest) => {
                let (ns_str, id) = rest
                    .split_once(';')
                    .ok_or_else(|| invalid("Missing identifier after namespace".to_string()))?;
                let ns: u16 = ns_str
                    .parse()
                    .map_err(|_| invalid("Invalid namespace index".to_string()))?;
                (ns, id)
            }
            None => (0, s),
        };

        let identifier = if let Some(id) = identifier_part.strip_prefix("i=") {
            let value: u32 = id
                .parse()
                .map_err(|_| invalid("Invalid numeric identifier".to_string()))?;
            NodeIdentifier::Numeric(value)
        } else if let Some(id) = identifier_part.strip_prefix("s=") {
            NodeIdentifier::String(id.to_string())
        } else if let Some(id) = identifier_part.strip_prefix("g=") {
            let uuid = Uuid::parse_str(id).map_err(|e| invalid(format!("Invalid GUID: {}", e)))?;
            NodeIdentifier::Guid(uuid)
        } else if let Some(id) = identifier_part.strip_prefix("b=") {
            let bytes = BASE64
                .decode(id)
                .map_err(|e| invalid(format!("Invalid base64: {}", e)))?;
            NodeIdentifier::Opaque(bytes)
        } else {
            return Err(invalid(
                "Unknown identifier type. Expected i=, s=, g=, or b=".to_string(),
            ));
        };

        Ok(Self {
            namespace_index,
            identifier,
        })
    }
}

// =============================================================================
// NodeIdentifier
// =============================================================================

/// OPC UA node identifier types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum NodeIdentifier {
    /// Numeric identifier.
    Numeric(u32),

    /// String identifier.
    String(String),

    /// GUID identifier.
    Guid(Uuid),

    /// Opaque identifier (application-specific byte array).
    Opaque(Vec<u8>),
}

impl fmt::Display for NodeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(v) => write!(f, "i={}", v),
            Self::String(v) => write!(f, "s={}", v),
            Self::Guid(v) => write!(f, "g={}", v),
            Self::Opaque(v) => write!(f, "b={}", BASE64.encode(v)),
        }
    }
}

// =============================================================================
// StatusCode
// =============================================================================

/// OPC UA status code.
///
/// The top two bits carry the severity: `00` good, `01` uncertain,
/// `10` bad. The next fourteen bits carry the sub-code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCode(pub u32);

impl StatusCode {
    /// Good.
    pub const GOOD: Self = Self(0x0000_0000);
    /// BadUnexpectedError.
    pub const BAD_UNEXPECTED_ERROR: Self = Self(0x8001_0000);
    /// BadInternalError.
    pub const BAD_INTERNAL_ERROR: Self = Self(0x8002_0000);
    /// BadCommunicationError.
    pub const BAD_COMMUNICATION_ERROR: Self = Self(0x8005_0000);
    /// BadTimeout.
    pub const BAD_TIMEOUT: Self = Self(0x800A_0000);
    /// BadServiceUnsupported.
    pub const BAD_SERVICE_UNSUPPORTED: Self = Self(0x800B_0000);
    /// BadShutdown.
    pub const BAD_SHUTDOWN: Self = Self(0x800C_0000);
    /// BadServerNotConnected.
    pub const BAD_SERVER_NOT_CONNECTED: Self = Self(0x800D_0000);
    /// BadSessionIdInvalid.
    pub const BAD_SESSION_ID_INVALID: Self = Self(0x8025_0000);
    /// BadSessionClosed.
    pub const BAD_SESSION_CLOSED: Self = Self(0x8026_0000);
    /// BadSessionNotActivated.
    pub const BAD_SESSION_NOT_ACTIVATED: Self = Self(0x8027_0000);
    /// BadSubscriptionIdInvalid.
    pub const BAD_SUBSCRIPTION_ID_INVALID: Self = Self(0x8028_0000);
    /// BadNodeIdInvalid.
    pub const BAD_NODE_ID_INVALID: Self = Self(0x8033_0000);
    /// BadNodeIdUnknown.
    pub const BAD_NODE_ID_UNKNOWN: Self = Self(0x8034_0000);
    /// BadTooManySubscriptions.
    pub const BAD_TOO_MANY_SUBSCRIPTIONS: Self = Self(0x8077_0000);
    /// BadSecureChannelClosed.
    pub const BAD_SECURE_CHANNEL_CLOSED: Self = Self(0x8086_0000);
    /// BadNotConnected.
    pub const BAD_NOT_CONNECTED: Self = Self(0x808A_0000);
    /// BadInvalidArgument.
    pub const BAD_INVALID_ARGUMENT: Self = Self(0x80AB_0000);
    /// BadConnectionRejected.
    pub const BAD_CONNECTION_REJECTED: Self = Self(0x80AC_0000);
    /// BadDisconnect.
    pub const BAD_DISCONNECT: Self = Self(0x80AD_0000);
    /// BadConnectionClosed.
    pub const BAD_CONNECTION_CLOSED: Self = Self(0x80AE_0000);

    /// Returns the raw code.
    #[inline]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Returns `true` if the severity is good.
    #[inline]
    pub const fn is_good(&self) -> bool {
        self.0 & 0xC000_0000 == 0
    }

    /// Returns `true` if the severity is uncertain.
    #[inline]
    pub const fn is_uncertain(&self) -> bool {
        self.0 & 0xC000_0000 == 0x4000_0000
    }

    /// Returns `true` if the severity is bad.
    #[inline]
    pub const fn is_bad(&self) -> bool {
        self.0 & 0x8000_0000 != 0
    }

    /// Returns the symbolic name, ignoring the info bits.
    pub fn name(&self) -> &'static str {
        match self.0 & 0xFFFF_0000 {
            0x0000_0000 => "Good",
            0x4000_0000 => "Uncertain",
            0x8000_0000 => "Bad",
            0x8001_0000 => "BadUnexpectedError",
            0x8002_0000 => "BadInternalError",
            0x8003_0000 => "BadOutOfMemory",
            0x8005_0000 => "BadCommunicationError",
            0x800A_0000 => "BadTimeout",
            0x800B_0000 => "BadServiceUnsupported",
            0x800C_0000 => "BadShutdown",
            0x800D_0000 => "BadServerNotConnected",
            0x8025_0000 => "BadSessionIdInvalid",
            0x8026_0000 => "BadSessionClosed",
            0x8027_0000 => "BadSessionNotActivated",
            0x8028_0000 => "BadSubscriptionIdInvalid",
            0x8033_0000 => "BadNodeIdInvalid",
            0x8034_0000 => "BadNodeIdUnknown",
            0x8077_0000 => "BadTooManySubscriptions",
            0x8086_0000 => "BadSecureChannelClosed",
            0x808A_0000 => "BadNotConnected",
            0x80AB_0000 => "BadInvalidArgument",
            0x80AC_0000 => "BadConnectionRejected",
            0x80AD_0000 => "BadDisconnect",
            0x80AE_0000 => "BadConnectionClosed",
            code if code & 0xC000_0000 == 0x4000_0000 => "Uncertain",
            code if code & 0x8000_0000 != 0 => "Bad",
            _ => "Good",
        }
    }
}

impl From<u32> for StatusCode {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:08X})", self.name(), self.0)
    }
}

// =============================================================================
// OpcUaDataType
// =============================================================================

/// OPC UA built-in data types for value interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpcUaDataType {
    /// Boolean value.
    Boolean,
    /// Signed 32-bit integer.
    Int32,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 64-bit integer.
    UInt64,
    /// 32-bit IEEE 754 float.
    Float,
    /// 64-bit IEEE 754 double.
    Double,
    /// UTF-8 string.
    String,
    /// Date and time.
    DateTime,
    /// Raw byte string.
    ByteString,
    /// Status code.
    StatusCode,
    /// Empty variant or any other type.
    Variant,
}

impl OpcUaDataType {
    /// Returns the OPC UA type ID for built-in types.
    pub const fn type_id(&self) -> u32 {
        match self {
            Self::Boolean => 1,
            Self::Int32 => 6,
            Self::UInt32 => 7,
            Self::Int64 => 8,
            Self::UInt64 => 9,
            Self::Float => 10,
            Self::Double => 11,
            Self::String => 12,
            Self::DateTime => 13,
            Self::ByteString => 15,
            Self::StatusCode => 19,
            Self::Variant => 24,
        }
    }

    /// Returns the display name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Int32 => "Int32",
            Self::UInt32 => "UInt32",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::String => "String",
            Self::DateTime => "DateTime",
            Self::ByteString => "ByteString",
            Self::StatusCode => "StatusCode",
            Self::Variant => "Variant",
        }
    }
}

impl fmt::Display for OpcUaDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// SecurityMode
// =============================================================================

/// OPC UA message security mode, as advertised by an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SecurityMode {
    /// Unknown or invalid mode.
    Invalid,

    /// No security (messages are neither signed nor encrypted).
    #[default]
    None,

    /// Messages are signed but not encrypted.
    Sign,

    /// Messages are signed and encrypted.
    SignAndEncrypt,
}

impl SecurityMode {
    /// Returns the OPC UA security mode value.
    pub const fn value(&self) -> u32 {
        match self {
            Self::Invalid => 0,
            Self::None => 1,
            Self::Sign => 2,
            Self::SignAndEncrypt => 3,
        }
    }

    /// Creates from OPC UA security mode value. Unknown values map to `Invalid`.
    pub fn from_value(value: u32) -> Self {
        match value {
            1 => Self::None,
            2 => Self::Sign,
            3 => Self::SignAndEncrypt,
            _ => Self::Invalid,
        }
    }

    /// Returns the display name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Invalid => "Invalid",
            Self::None => "None",
            Self::Sign => "Sign",
            Self::SignAndEncrypt => "SignAndEncrypt",
        }
    }
}

impl fmt::Display for SecurityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// TimestampsToReturn
// =============================================================================

/// Which timestamps the server attaches to returned values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimestampsToReturn {
    /// Source timestamp only.
    Source,
    /// Server timestamp only.
    Server,
    /// Both source and server timestamps.
    #[default]
    Both,
    /// No timestamps.
    Neither,
}

impl TimestampsToReturn {
    /// Returns the OPC UA value.
    pub const fn value(&self) -> u32 {
        match self {
            Self::Source => 0,
            Self::Server => 1,
            Self::Both => 2,
            Self::Neither => 3,
        }
    }
}

// =============================================================================
// MonitoringMode
// =============================================================================

/// OPC UA monitoring mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MonitoringMode {
    /// Monitoring disabled.
    Disabled,

    /// Sampling enabled, reporting disabled.
    Sampling,

    /// Sampling and reporting enabled.
    #[default]
    Reporting,
}

impl MonitoringMode {
    /// Returns the OPC UA value.
    pub const fn value(&self) -> u32 {
        match self {
            Self::Disabled => 0,
            Self::Sampling => 1,
            Self::Reporting => 2,
        }
    }
}

// =============================================================================
// AttributeId
// =============================================================================

/// OPC UA attribute IDs used by monitored item requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AttributeId {
    /// Node ID attribute.
    NodeId,
    /// Browse name attribute.
    BrowseName,
    /// Display name attribute.
    DisplayName,
    /// Event notifier attribute.
    EventNotifier,
    /// Value attribute.
    #[default]
    Value,
    /// Data type attribute.
    DataType,
}

impl AttributeId {
    /// Returns the OPC UA numeric value.
    pub const fn value(&self) -> u32 {
        match self {
            Self::NodeId => 1,
            Self::BrowseName => 3,
            Self::DisplayName => 4,
            Self::EventNotifier => 12,
            Self::Value => 13,
            Self::DataType => 14,
        }
    }
}

// =============================================================================
// ClientSettings
// =============================================================================

/// OPC UA client configuration.
///
/// Durations are written in humantime form (`"1s"`, `"500ms"`) when
/// serialized.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use ualoop_opcua::types::ClientSettings;
///
/// let settings = ClientSettings::builder()
///     .endpoint("opc.tcp://plc.local:4840")
///     .connect_timeout(Duration::from_secs(2))
///     .build()
///     .unwrap();
/// assert_eq!(settings.connect_timeout, Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Server endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Application name announced to the server.
    #[serde(default = "default_application_name")]
    pub application_name: String,

    /// Application URI announced to the server.
    #[serde(default = "default_application_uri")]
    pub application_uri: String,

    /// Bound on a single connect attempt.
    #[serde(default = "default_connect_timeout")]
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Requested session timeout.
    #[serde(default = "default_session_timeout")]
    #[serde(with = "humantime_serde")]
    pub session_timeout: Duration,

    /// Subscription request parameters.
    #[serde(default)]
    pub subscription: SubscriptionSettings,

    /// Monitored item request parameters.
    #[serde(default)]
    pub monitored_item: MonitoredItemSettings,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_application_name() -> String {
    "ualoop OPC UA Client".to_string()
}

fn default_application_uri() -> String {
    "urn:ualoop:client".to_string()
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(1)
}

fn default_session_timeout() -> Duration {
    Duration::from_secs(60)
}

impl ClientSettings {
    /// Creates a new settings builder.
    pub fn builder() -> ClientSettingsBuilder {
        ClientSettingsBuilder::default()
    }

    /// Creates default settings for the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Validates these settings.
    pub fn validate(&self) -> Result<(), OpcUaError> {
        validate_endpoint(&self.endpoint)?;

        if self.connect_timeout.is_zero() {
            return Err(OpcUaError::configuration(ConfigurationError::invalid_timeout(
                self.connect_timeout,
                "Connect timeout must be greater than 0",
            )));
        }

        if self.session_timeout.is_zero() {
            return Err(OpcUaError::configuration(ConfigurationError::invalid_timeout(
                self.session_timeout,
                "Session timeout must be greater than 0",
            )));
        }

        self.subscription.validate()?;
        self.monitored_item.validate()
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            application_name: default_application_name(),
            application_uri: default_application_uri(),
            connect_timeout: default_connect_timeout(),
            session_timeout: default_session_timeout(),
            subscription: SubscriptionSettings::default(),
            monitored_item: MonitoredItemSettings::default(),
        }
    }
}

/// Checks that `endpoint` is a non-empty `opc.tcp://` URL with a host part.
pub fn validate_endpoint(endpoint: &str) -> Result<(), OpcUaError> {
    if endpoint.is_empty() {
        return Err(OpcUaError::configuration(ConfigurationError::missing_field(
            "endpoint",
        )));
    }

    match endpoint.strip_prefix("opc.tcp://") {
        None => Err(OpcUaError::configuration(ConfigurationError::invalid_endpoint(
            endpoint,
            "Endpoint must start with opc.tcp://",
        ))),
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with(':') => Err(
            OpcUaError::configuration(ConfigurationError::invalid_endpoint(
                endpoint,
                "Endpoint has no host",
            )),
        ),
        Some(_) => Ok(()),
    }
}

// =============================================================================
// ClientSettingsBuilder
// =============================================================================

/// Builder for `ClientSettings`.
#[derive(Debug, Default)]
pub struct ClientSettingsBuilder {
    endpoint: Option<String>,
    application_name: Option<String>,
    application_uri: Option<String>,
    connect_timeout: Option<Duration>,
    session_timeout: Option<Duration>,
    subscription: Option<SubscriptionSettings>,
    monitored_item: Option<MonitoredItemSettings>,
}

impl ClientSettingsBuilder {
    /// Sets the server endpoint URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the application name.
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    /// Sets the application URI.
    pub fn application_uri(mut self, uri: impl Into<String>) -> Self {
        self.application_uri = Some(uri.into());
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the session timeout.
    pub fn session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = Some(timeout);
        self
    }

    /// Sets the subscription settings.
    pub fn subscription(mut self, settings: SubscriptionSettings) -> Self {
        self.subscription = Some(settings);
        self
    }

    /// Sets the monitored item settings.
    pub fn monitored_item(mut self, settings: MonitoredItemSettings) -> Self {
        self.monitored_item = Some(settings);
        self
    }

    /// Builds and validates the settings.
    pub fn build(self) -> Result<ClientSettings, OpcUaError> {
        let settings = ClientSettings {
            endpoint: self.endpoint.unwrap_or_else(default_endpoint),
            application_name: self.application_name.unwrap_or_else(default_application_name),
            application_uri: self.application_uri.unwrap_or_else(default_application_uri),
            connect_timeout: self.connect_timeout.unwrap_or_else(default_connect_timeout),
            session_timeout: self.session_timeout.unwrap_or_else(default_session_timeout),
            subscription: self.subscription.unwrap_or_default(),
            monitored_item: self.monitored_item.unwrap_or_default(),
        };

        settings.validate()?;
        Ok(settings)
    }
}

// =============================================================================
// SubscriptionSettings
// =============================================================================

/// Parameters of a create-subscription request.
///
/// The defaults are the OPC UA default request: 500 ms publishing
/// interval, lifetime 10000, keep-alive 10, unlimited notifications per
/// publish, priority 0, publishing enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionSettings {
    /// Requested publishing interval.
    #[serde(default = "default_publishing_interval")]
    #[serde(with = "humantime_serde")]
    pub publishing_interval: Duration,

    /// Lifetime count (publishing intervals without a publish request
    /// before the server drops the subscription).
    #[serde(default = "default_lifetime_count")]
    pub lifetime_count: u32,

    /// Max keep-alive count.
    #[serde(default = "default_keepalive_count")]
    pub keepalive_count: u32,

    /// Maximum notifications per publish. 0 means unlimited.
    #[serde(default)]
    pub max_notifications_per_publish: u32,

    /// Priority (0-255, higher is more important).
    #[serde(default)]
    pub priority: u8,

    /// Publishing enabled.
    #[serde(default = "default_true")]
    pub publishing_enabled: bool,
}

fn default_publishing_interval() -> Duration {
    Duration::from_millis(500)
}

fn default_lifetime_count() -> u32 {
    10_000
}

fn default_keepalive_count() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

impl Default for SubscriptionSettings {
    fn default() -> Self {
        Self {
            publishing_interval: default_publishing_interval(),
            lifetime_count: default_lifetime_count(),
            keepalive_count: default_keepalive_count(),
            max_notifications_per_publish: 0,
            priority: 0,
            publishing_enabled: true,
        }
    }
}

impl SubscriptionSettings {
    /// Creates settings with a custom publishing interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            publishing_interval: interval,
            ..Default::default()
        }
    }

    /// Validates the request parameters.
    ///
    /// The lifetime count must be at least three times the keep-alive count.
    pub fn validate(&self) -> Result<(), OpcUaError> {
        if self.publishing_interval.is_zero() {
            return Err(OpcUaError::configuration(ConfigurationError::invalid_timeout(
                self.publishing_interval,
                "Publishing interval must be greater than 0",
            )));
        }

        if self.keepalive_count == 0 {
            return Err(OpcUaError::configuration(ConfigurationError::invalid_value(
                "keepalive_count",
                "must be greater than 0",
            )));
        }

        if self.keepalive_count > self.lifetime_count / 3 {
            return Err(OpcUaError::configuration(ConfigurationError::invalid_value(
                "lifetime_count",
                format!(
                    "lifetime {} must be at least three times keep-alive {}",
                    self.lifetime_count, self.keepalive_count
                ),
            )));
        }

        Ok(())
    }
}

// =============================================================================
// MonitoredItemSettings
// =============================================================================

/// Parameters of a create-monitored-item request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoredItemSettings {
    /// Sampling interval.
    #[serde(default = "default_sampling_interval")]
    #[serde(with = "humantime_serde")]
    pub sampling_interval: Duration,

    /// Queue size for buffered values.
    #[serde(default = "default_queue_size")]
    pub queue_size: u32,

    /// Discard the oldest value when the queue is full.
    #[serde(default = "default_true")]
    pub discard_oldest: bool,

    /// Monitoring mode.
    #[serde(default)]
    pub monitoring_mode: MonitoringMode,
}

fn default_sampling_interval() -> Duration {
    Duration::from_millis(250)
}

fn default_queue_size() -> u32 {
    1
}

impl Default for MonitoredItemSettings {
    fn default() -> Self {
        Self {
            sampling_interval: default_sampling_interval(),
            queue_size: default_queue_size(),
            discard_oldest: true,
            monitoring_mode: MonitoringMode::default(),
        }
    }
}

impl MonitoredItemSettings {
    /// Creates settings with a custom sampling interval.
    pub fn with_sampling_interval(interval: Duration) -> Self {
        Self {
            sampling_interval: interval,
            ..Default::default()
        }
    }

    /// Validates the request parameters.
    pub fn validate(&self) -> Result<(), OpcUaError> {
        if self.queue_size == 0 {
            return Err(OpcUaError::configuration(ConfigurationError::invalid_value(
                "queue_size",
                "must be greater than 0",
            )));
        }
        Ok(())
    }
}

// =============================================================================
// humantime_serde helper
// =============================================================================

/// Serde adapter for `Duration` fields written as `"1s"`, `"250ms"`.
pub mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    /// Serializes a duration in humantime form.
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        humantime::format_duration(*duration)
            .to_string()
            .serialize(serializer)
    }

    /// Deserializes a duration from humantime form.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // NodeId
    // -------------------------------------------------------------------------

    #[test]
    fn test_node_id_parse_numeric() {
        let node: NodeId = "ns=0;i=2258".parse().unwrap();
        assert_eq!(node, NodeId::SERVER_STATUS_CURRENT_TIME);
        assert_eq!(node.identifier, NodeIdentifier::Numeric(2258));

        let short: NodeId = "i=2258".parse().unwrap();
        assert_eq!(short, node);
    }

    #[test]
    fn test_node_id_parse_other_identifiers() {
        let node: NodeId = "ns=2;s=Line1.Speed".parse().unwrap();
        assert_eq!(node.identifier, NodeIdentifier::String("Line1.Speed".to_string()));

        let node: NodeId = "ns=3;g=550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
        assert!(matches!(node.identifier, NodeIdentifier::Guid(_)));

        let node: NodeId = "ns=1;b=SGVsbG8=".parse().unwrap();
        assert_eq!(node.identifier, NodeIdentifier::Opaque(b"Hello".to_vec()));
    }

    #[test]
    fn test_node_id_parse_errors() {
        assert!("ns=x;i=1".parse::<NodeId>().is_err());
        assert!("ns=1".parse::<NodeId>().is_err());
        assert!("ns=1;q=1".parse::<NodeId>().is_err());
        assert!("i=abc".parse::<NodeId>().is_err());
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId::SERVER_STATUS_CURRENT_TIME.to_string(), "ns=0;i=2258");
        let tag: NodeId = "ns=2;s=Tag".parse().unwrap();
        assert_eq!(tag.to_string(), "ns=2;s=Tag");
        assert_eq!(NodeId::default().to_string(), "ns=0;i=0");
    }

    // -------------------------------------------------------------------------
    // StatusCode
    // -------------------------------------------------------------------------

    #[test]
    fn test_status_code_severity() {
        assert!(StatusCode::GOOD.is_good());
        assert!(!StatusCode::GOOD.is_bad());
        assert!(StatusCode::BAD_TIMEOUT.is_bad());
        assert!(StatusCode(0x4000_0000).is_uncertain());
    }

    #[test]
    fn test_status_code_names() {
        assert_eq!(StatusCode::BAD_INVALID_ARGUMENT.name(), "BadInvalidArgument");
        assert_eq!(StatusCode::BAD_CONNECTION_CLOSED.name(), "BadConnectionClosed");
        assert_eq!(StatusCode(0x8034_0400).name(), "BadNodeIdUnknown");
        assert_eq!(StatusCode(0x80FF_0000).name(), "Bad");
        assert_eq!(
            StatusCode::BAD_TIMEOUT.to_string(),
            "BadTimeout (0x800A0000)"
        );
    }

    // -------------------------------------------------------------------------
    // ClientSettings
    // -------------------------------------------------------------------------

    #[test]
    fn test_client_settings_defaults() {
        let settings = ClientSettings::default();
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.connect_timeout, Duration::from_secs(1));
        assert_eq!(
            settings.subscription.publishing_interval,
            Duration::from_millis(500)
        );
        assert_eq!(settings.subscription.lifetime_count, 10_000);
        assert_eq!(settings.subscription.keepalive_count, 10);
        assert_eq!(settings.subscription.max_notifications_per_publish, 0);
        assert!(settings.subscription.publishing_enabled);
        assert_eq!(settings.monitored_item.queue_size, 1);
        assert!(settings.monitored_item.discard_oldest);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_client_settings_builder_validation() {
        assert!(ClientSettings::builder()
            .endpoint("http://localhost:4840")
            .build()
            .is_err());

        assert!(ClientSettings::builder()
            .endpoint("opc.tcp://")
            .build()
            .is_err());

        assert!(ClientSettings::builder()
            .connect_timeout(Duration::ZERO)
            .build()
            .is_err());

        let too_chatty = SubscriptionSettings {
            lifetime_count: 20,
            keepalive_count: 10,
            ..Default::default()
        };
        assert!(ClientSettings::builder()
            .subscription(too_chatty)
            .build()
            .is_err());
    }

    #[test]
    fn test_client_settings_yaml() {
        let yaml = r#"
endpoint: "opc.tcp://plc.local:4840"
connect_timeout: "2s"
subscription:
  publishing_interval: "100ms"
"#;
        let settings: ClientSettings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.endpoint, "opc.tcp://plc.local:4840");
        assert_eq!(settings.connect_timeout, Duration::from_secs(2));
        assert_eq!(
            settings.subscription.publishing_interval,
            Duration::from_millis(100)
        );
        assert_eq!(settings.subscription.lifetime_count, 10_000);
        assert_eq!(settings.session_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_enum_values() {
        assert_eq!(TimestampsToReturn::Both.value(), 2);
        assert_eq!(TimestampsToReturn::default(), TimestampsToReturn::Both);
        assert_eq!(MonitoringMode::default().value(), 2);
        assert_eq!(AttributeId::default().value(), 13);
        assert_eq!(SecurityMode::from_value(3), SecurityMode::SignAndEncrypt);
        assert_eq!(SecurityMode::from_value(9), SecurityMode::Invalid);
    }
}
