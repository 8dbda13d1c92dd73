// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA client error types.
//!
//! Every failure the client surface can report is an [`OpcUaError`]. The
//! variants follow the stage of the client lifecycle that produced them:
//!
//! ```text
//! OpcUaError
//! ├── Connection    - Secure channel and endpoint issues
//! ├── Subscription  - Subscription and monitored item errors
//! ├── Discovery     - GetEndpoints / FindServers / FindServersOnNetwork
//! ├── Configuration - Invalid settings
//! └── Timeout       - Connect attempts that ran out of time
//! ```
//!
//! None of these are fatal to the supervisor loop. They are logged with
//! [`OpcUaError::log`], which picks the tracing level from the severity.
//!
//! # Examples
//!
//! ```
//! use ualoop_opcua::error::{DiscoveryError, OpcUaError};
//! use ualoop_opcua::types::StatusCode;
//!
//! let error = OpcUaError::discovery(DiscoveryError::connected_elsewhere(
//!     "opc.tcp://plc-a:4840",
//!     "opc.tcp://plc-b:4840",
//! ));
//! assert_eq!(error.status_code(), Some(StatusCode::BAD_INVALID_ARGUMENT));
//! assert_eq!(error.error_code().to_string(), "UA-0401");
//! ```

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tracing::Level;

use crate::types::StatusCode;

/// Result type for OPC UA client operations.
pub type OpcUaResult<T> = Result<T, OpcUaError>;

// =============================================================================
// OpcUaError
// =============================================================================

/// The main error type for OPC UA client operations.
#[derive(Debug, Error)]
pub enum OpcUaError {
    /// Connection-related errors.
    #[error("{0}")]
    Connection(#[from] ConnectionError),

    /// Subscription and monitoring errors.
    #[error("{0}")]
    Subscription(#[from] SubscriptionError),

    /// Discovery service errors.
    #[error("{0}")]
    Discovery(#[from] DiscoveryError),

    /// Configuration errors.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// Timeout errors.
    #[error("{0}")]
    Timeout(#[from] TimeoutError),
}

impl OpcUaError {
    /// Creates a connection error.
    #[inline]
    pub fn connection(error: ConnectionError) -> Self {
        Self::Connection(error)
    }

    /// Creates a subscription error.
    #[inline]
    pub fn subscription(error: SubscriptionError) -> Self {
        Self::Subscription(error)
    }

    /// Creates a discovery error.
    #[inline]
    pub fn discovery(error: DiscoveryError) -> Self {
        Self::Discovery(error)
    }

    /// Creates a configuration error.
    #[inline]
    pub fn configuration(error: ConfigurationError) -> Self {
        Self::Configuration(error)
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(error: TimeoutError) -> Self {
        Self::Timeout(error)
    }

    /// Shorthand for a refused connection without a stack status.
    pub fn connection_refused(endpoint: impl Into<String>) -> Self {
        Self::Connection(ConnectionError::Refused {
            endpoint: endpoint.into(),
            status: None,
        })
    }

    /// Shorthand for a service call made without an open channel.
    pub fn not_connected() -> Self {
        Self::Connection(ConnectionError::NotConnected)
    }

    /// Returns the severity of this error.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Connection(e) => e.severity(),
            Self::Subscription(e) => e.severity(),
            Self::Discovery(_) | Self::Timeout(_) => ErrorSeverity::Warning,
            Self::Configuration(_) => ErrorSeverity::Critical,
        }
    }

    /// Returns the error category for logging.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::Subscription(_) => "subscription",
            Self::Discovery(_) => "discovery",
            Self::Configuration(_) => "configuration",
            Self::Timeout(_) => "timeout",
        }
    }

    /// Returns the structured code of this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Connection(e) => e.error_code(),
            Self::Subscription(e) => e.error_code(),
            Self::Discovery(e) => e.error_code(),
            Self::Configuration(e) => e.error_code(),
            Self::Timeout(_) => ErrorCode::new(9, 1),
        }
    }

    /// Returns the OPC UA status code carried by this error, if the server
    /// or the stack reported one.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Connection(ConnectionError::Refused { status, .. }) => *status,
            Self::Connection(_) | Self::Configuration(_) => None,
            Self::Subscription(e) => Some(e.status_code()),
            Self::Discovery(e) => Some(e.status_code()),
            Self::Timeout(_) => Some(StatusCode::BAD_TIMEOUT),
        }
    }

    /// Logs this error at the level of its severity.
    pub fn log(&self, context: &str) {
        let code = self.error_code();
        let status = self.status_code().map(|s| s.name()).unwrap_or("-");

        if self.severity().to_tracing_level() == Level::ERROR {
            tracing::error!(
                error_code = %code,
                category = self.category(),
                status,
                context,
                "{self}"
            );
        } else {
            tracing::warn!(
                error_code = %code,
                category = self.category(),
                status,
                context,
                "{self}"
            );
        }
    }
}

// =============================================================================
// ConnectionError
// =============================================================================

/// Secure channel and endpoint errors.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The endpoint could not be reached or rejected the handshake.
    #[error("Connection refused to '{endpoint}'")]
    Refused {
        /// Target endpoint.
        endpoint: String,
        /// Status reported by the stack, if any.
        status: Option<StatusCode>,
    },

    /// The attempt did not finish in time.
    #[error("Connection timed out to '{endpoint}' after {duration:?}")]
    TimedOut {
        /// Target endpoint.
        endpoint: String,
        /// Elapsed bound.
        duration: Duration,
    },

    /// The stack could not be set up for this endpoint.
    #[error("Invalid endpoint URL: '{url}' - {reason}")]
    InvalidEndpoint {
        /// Endpoint URL.
        url: String,
        /// Reason.
        reason: String,
    },

    /// The connection went away underneath a call.
    #[error("Connection closed unexpectedly")]
    Closed {
        /// Reason for closure.
        reason: Option<String>,
    },

    /// A service needs an open channel.
    #[error("Not connected to OPC UA server")]
    NotConnected,
}

impl ConnectionError {
    /// Creates a refusal carrying the stack's status.
    pub fn refused_with_status(endpoint: impl Into<String>, status: StatusCode) -> Self {
        Self::Refused {
            endpoint: endpoint.into(),
            status: Some(status),
        }
    }

    /// Creates a connect timeout.
    pub fn timed_out(endpoint: impl Into<String>, duration: Duration) -> Self {
        Self::TimedOut {
            endpoint: endpoint.into(),
            duration,
        }
    }

    /// Creates an invalid endpoint error.
    pub fn invalid_endpoint(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a connection closed error.
    pub fn closed(reason: Option<String>) -> Self {
        Self::Closed { reason }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Refused { .. } | Self::InvalidEndpoint { .. } => ErrorSeverity::Error,
            _ => ErrorSeverity::Warning,
        }
    }

    fn error_code(&self) -> ErrorCode {
        match self {
            Self::Refused { .. } => ErrorCode::new(1, 1),
            Self::TimedOut { .. } => ErrorCode::new(1, 2),
            Self::InvalidEndpoint { .. } => ErrorCode::new(1, 4),
            Self::Closed { .. } => ErrorCode::new(1, 7),
            Self::NotConnected => ErrorCode::new(1, 8),
        }
    }
}

// =============================================================================
// SubscriptionError
// =============================================================================

/// Subscription and monitored item errors.
#[derive(Debug, Error)]
pub enum SubscriptionError {
    /// The server rejected CreateSubscription.
    #[error("Failed to create subscription: {status}")]
    CreationFailed {
        /// Service result reported by the server.
        status: StatusCode,
    },

    /// The server rejected the monitored item.
    #[error("Failed to create monitored item for node '{node_id}': {status}")]
    MonitoredItemFailed {
        /// Monitored node.
        node_id: String,
        /// Status reported for the item.
        status: StatusCode,
    },
}

impl SubscriptionError {
    /// Creates a subscription creation failure.
    pub fn creation_failed(status: StatusCode) -> Self {
        Self::CreationFailed { status }
    }

    /// Creates a monitored item failure.
    pub fn monitored_item_failed(node_id: impl Into<String>, status: StatusCode) -> Self {
        Self::MonitoredItemFailed {
            node_id: node_id.into(),
            status,
        }
    }

    /// Returns the status reported by the server.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::CreationFailed { status } | Self::MonitoredItemFailed { status, .. } => *status,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::CreationFailed { .. } => ErrorSeverity::Error,
            Self::MonitoredItemFailed { .. } => ErrorSeverity::Warning,
        }
    }

    fn error_code(&self) -> ErrorCode {
        match self {
            Self::CreationFailed { .. } => ErrorCode::new(6, 1),
            Self::MonitoredItemFailed { .. } => ErrorCode::new(6, 4),
        }
    }
}

// =============================================================================
// DiscoveryError
// =============================================================================

/// The discovery service a request was sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscoveryService {
    /// GetEndpoints.
    GetEndpoints,
    /// FindServers.
    FindServers,
    /// FindServersOnNetwork.
    FindServersOnNetwork,
}

impl DiscoveryService {
    /// Returns the service name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GetEndpoints => "GetEndpoints",
            Self::FindServers => "FindServers",
            Self::FindServersOnNetwork => "FindServersOnNetwork",
        }
    }
}

impl fmt::Display for DiscoveryService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Discovery service errors.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The client already holds a channel to another server.
    #[error("Client is connected to '{connected}', cannot query '{requested}'")]
    ConnectedElsewhere {
        /// Endpoint the channel is open to.
        connected: String,
        /// Endpoint that was requested.
        requested: String,
    },

    /// The service returned a bad service result.
    #[error("{service} request to '{url}' failed with {status}")]
    RequestFailed {
        /// Service that failed.
        service: DiscoveryService,
        /// Requested URL.
        url: String,
        /// Service result.
        status: StatusCode,
    },
}

impl DiscoveryError {
    /// Creates a connected elsewhere error.
    pub fn connected_elsewhere(connected: impl Into<String>, requested: impl Into<String>) -> Self {
        Self::ConnectedElsewhere {
            connected: connected.into(),
            requested: requested.into(),
        }
    }

    /// Creates a request failure.
    pub fn request_failed(
        service: DiscoveryService,
        url: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self::RequestFailed {
            service,
            url: url.into(),
            status,
        }
    }

    /// Returns the status code equivalent.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ConnectedElsewhere { .. } => StatusCode::BAD_INVALID_ARGUMENT,
            Self::RequestFailed { status, .. } => *status,
        }
    }

    fn error_code(&self) -> ErrorCode {
        match self {
            Self::ConnectedElsewhere { .. } => ErrorCode::new(4, 1),
            Self::RequestFailed { .. } => ErrorCode::new(4, 2),
        }
    }
}

// =============================================================================
// ConfigurationError
// =============================================================================

/// Invalid client settings.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Endpoint URL is not an `opc.tcp://` URL.
    #[error("Invalid endpoint URL: {url} ({reason})")]
    InvalidEndpoint {
        /// The URL.
        url: String,
        /// Reason.
        reason: String,
    },

    /// Node ID does not parse.
    #[error("Invalid node ID format: {node_id} ({reason})")]
    InvalidNodeId {
        /// The node ID text.
        node_id: String,
        /// Reason.
        reason: String,
    },

    /// A duration is out of range.
    #[error("Invalid timeout: {duration:?} ({reason})")]
    InvalidTimeout {
        /// The duration.
        duration: Duration,
        /// Reason.
        reason: String,
    },

    /// A required field is empty.
    #[error("Missing required configuration: {field}")]
    MissingField {
        /// Field name.
        field: String,
    },

    /// A field holds an unusable value.
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Reason.
        reason: String,
    },
}

impl ConfigurationError {
    /// Creates an invalid endpoint error.
    pub fn invalid_endpoint(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid node ID error.
    pub fn invalid_node_id(node_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidNodeId {
            node_id: node_id.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid timeout error.
    pub fn invalid_timeout(duration: Duration, reason: impl Into<String>) -> Self {
        Self::InvalidTimeout {
            duration,
            reason: reason.into(),
        }
    }

    /// Creates a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    fn error_code(&self) -> ErrorCode {
        let code = match self {
            Self::InvalidEndpoint { .. } => 1,
            Self::InvalidNodeId { .. } => 2,
            Self::InvalidTimeout { .. } => 4,
            Self::MissingField { .. } => 5,
            Self::InvalidValue { .. } => 6,
        };
        ErrorCode::new(8, code)
    }
}

// =============================================================================
// TimeoutError
// =============================================================================

/// A connect attempt that exceeded the configured connect timeout.
#[derive(Debug, Error)]
#[error("Connection timed out after {duration:?}")]
pub struct TimeoutError {
    /// Elapsed bound.
    pub duration: Duration,
}

impl TimeoutError {
    /// Creates a connect timeout.
    pub fn connection(duration: Duration) -> Self {
        Self { duration }
    }
}

// =============================================================================
// ErrorSeverity / ErrorCode
// =============================================================================

/// How loudly an error is logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    /// Expected during normal operation, e.g. a server that is not up yet.
    Warning,
    /// A request failed and its effect is lost until the next attempt.
    Error,
    /// The client cannot work with its current settings.
    Critical,
}

impl ErrorSeverity {
    /// Converts to a tracing level.
    pub fn to_tracing_level(self) -> Level {
        match self {
            Self::Warning => Level::WARN,
            Self::Error | Self::Critical => Level::ERROR,
        }
    }
}

/// Structured error code, displayed as `UA-CCNN` (category, code).
///
/// Categories: 1 connection, 4 discovery, 6 subscription,
/// 8 configuration, 9 timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    /// Category.
    pub category: u8,
    /// Specific error within category.
    pub code: u8,
}

impl ErrorCode {
    /// Creates a new error code.
    pub const fn new(category: u8, code: u8) -> Self {
        Self { category, code }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UA-{:02X}{:02X}", self.category, self.code)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        let err = OpcUaError::subscription(SubscriptionError::creation_failed(
            StatusCode::BAD_TOO_MANY_SUBSCRIPTIONS,
        ));
        assert_eq!(err.error_code().to_string(), "UA-0601");
        assert_eq!(err.category(), "subscription");

        let err = OpcUaError::configuration(ConfigurationError::missing_field("endpoint"));
        assert_eq!(err.error_code().to_string(), "UA-0805");
    }

    #[test]
    fn test_status_code_propagation() {
        let err = OpcUaError::subscription(SubscriptionError::monitored_item_failed(
            "i=2258",
            StatusCode::BAD_NODE_ID_UNKNOWN,
        ));
        assert_eq!(err.status_code(), Some(StatusCode::BAD_NODE_ID_UNKNOWN));

        let err = OpcUaError::discovery(DiscoveryError::connected_elsewhere(
            "opc.tcp://a:4840",
            "opc.tcp://b:4840",
        ));
        assert_eq!(err.status_code(), Some(StatusCode::BAD_INVALID_ARGUMENT));

        assert_eq!(OpcUaError::not_connected().status_code(), None);
        assert_eq!(
            OpcUaError::timeout(TimeoutError::connection(Duration::from_secs(1))).status_code(),
            Some(StatusCode::BAD_TIMEOUT)
        );
    }

    #[test]
    fn test_discovery_failure_names_service() {
        let err = DiscoveryError::request_failed(
            DiscoveryService::FindServersOnNetwork,
            "opc.tcp://lds:4840",
            StatusCode::BAD_SERVICE_UNSUPPORTED,
        );
        assert!(err.to_string().starts_with("FindServersOnNetwork request"));
        assert_eq!(err.status_code(), StatusCode::BAD_SERVICE_UNSUPPORTED);
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(
            OpcUaError::not_connected().severity().to_tracing_level(),
            Level::WARN
        );
        assert_eq!(
            OpcUaError::connection_refused("opc.tcp://x:4840").severity(),
            ErrorSeverity::Error
        );
        assert_eq!(
            OpcUaError::configuration(ConfigurationError::missing_field("endpoint")).severity(),
            ErrorSeverity::Critical
        );
        assert!(ErrorSeverity::Critical > ErrorSeverity::Warning);
    }
}
