// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Discovery services.
//!
//! - [`discover_endpoints`]: GetEndpoints, the endpoints of one server.
//! - [`find_servers`]: FindServers, the servers known to a server or to a
//!   local discovery server.
//! - [`find_servers_on_network`]: FindServersOnNetwork, the servers a
//!   discovery server has seen announced on the network.
//!
//! All three follow the same channel rules. An open channel to the same
//! server is reused; an open channel to another server is an error;
//! without a channel, one is opened just for the request and closed again.

use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

use crate::error::{DiscoveryError, OpcUaError, OpcUaResult};
use crate::types::SecurityMode;

use super::transport::UaClient;

/// Prefix shared by all security policy URIs.
pub const SECURITY_POLICY_URI_PREFIX: &str = "http://opcfoundation.org/UA/SecurityPolicy#";

// =============================================================================
// EndpointDescription
// =============================================================================

/// One endpoint offered by a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescription {
    /// Endpoint URL.
    pub endpoint_url: String,

    /// Message security mode.
    pub security_mode: SecurityMode,

    /// Full security policy URI.
    pub security_policy_uri: String,

    /// Relative security level assigned by the server. Higher is more secure.
    pub security_level: u8,

    /// Transport profile URI.
    #[serde(default)]
    pub transport_profile_uri: String,

    /// DER-encoded server certificate, empty when the endpoint has none.
    #[serde(default)]
    pub server_certificate: Vec<u8>,
}

impl EndpointDescription {
    /// Creates an unsecured endpoint description.
    pub fn unsecured(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            security_mode: SecurityMode::None,
            security_policy_uri: format!("{}None", SECURITY_POLICY_URI_PREFIX),
            security_level: 0,
            transport_profile_uri: String::new(),
            server_certificate: Vec::new(),
        }
    }

    /// Returns the policy name, e.g. `Basic256Sha256`.
    pub fn security_policy_name(&self) -> &str {
        self.security_policy_uri
            .strip_prefix(SECURITY_POLICY_URI_PREFIX)
            .unwrap_or(&self.security_policy_uri)
    }

    /// Returns the server certificate in base64, if present.
    pub fn certificate_base64(&self) -> Option<String> {
        if self.server_certificate.is_empty() {
            None
        } else {
            Some(BASE64.encode(&self.server_certificate))
        }
    }
}

impl fmt::Display for EndpointDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{} / {}, level {}]",
            self.endpoint_url,
            self.security_mode,
            self.security_policy_name(),
            self.security_level
        )
    }
}

// =============================================================================
// FindServers / FindServersOnNetwork
// =============================================================================

/// Role of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ApplicationType {
    /// Server.
    #[default]
    Server,
    /// Client.
    Client,
    /// Client and server.
    ClientAndServer,
    /// Discovery server.
    DiscoveryServer,
}

impl ApplicationType {
    /// Maps the wire value, unknown values read as `Server`.
    pub fn from_value(value: u32) -> Self {
        match value {
            1 => Self::Client,
            2 => Self::ClientAndServer,
            3 => Self::DiscoveryServer,
            _ => Self::Server,
        }
    }
}

/// One application returned by FindServers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDescription {
    /// Globally unique application URI.
    pub application_uri: String,

    /// Product URI.
    #[serde(default)]
    pub product_uri: String,

    /// Display name.
    pub application_name: String,

    /// Role.
    pub application_type: ApplicationType,

    /// URLs of the application's discovery endpoints.
    #[serde(default)]
    pub discovery_urls: Vec<String>,
}

impl fmt::Display for ApplicationDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {:?}, {} discovery url(s))",
            self.application_name,
            self.application_uri,
            self.application_type,
            self.discovery_urls.len()
        )
    }
}

/// Filters of a FindServers request. Empty lists mean no filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindServersRequest {
    /// Only return servers with one of these application URIs.
    pub server_uris: Vec<String>,

    /// Preferred locales for the application names.
    pub locale_ids: Vec<String>,
}

/// Paging and filter of a FindServersOnNetwork request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindServersOnNetworkRequest {
    /// First record to return.
    pub starting_record_id: u32,

    /// Maximum number of records, 0 for no limit.
    pub max_records_to_return: u32,

    /// Only return servers with all of these capabilities.
    pub server_capability_filter: Vec<String>,
}

/// One server announced on the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerOnNetwork {
    /// Record id assigned by the discovery server.
    pub record_id: u32,

    /// Announced server name.
    pub server_name: String,

    /// Discovery URL.
    pub discovery_url: String,

    /// Capability identifiers, e.g. `DA` or `HD`.
    #[serde(default)]
    pub server_capabilities: Vec<String>,
}

// =============================================================================
// Service helpers
// =============================================================================

/// Requests the endpoint descriptions of the server at `server_url`.
///
/// - Channel open to a server whose URL is not a prefix of `server_url`:
///   fails with `BadInvalidArgument` and leaves the connection alone.
/// - Channel open to the same server: the request reuses it and the
///   client stays connected.
/// - No open channel: a secure channel without session is opened for the
///   request and disconnected afterwards, whatever the outcome.
///
/// # Errors
///
/// Returns the error of opening the channel, or the bad service result of
/// the GetEndpoints request. The latter is also logged with its status
/// name.
pub async fn discover_endpoints(
    client: &mut dyn UaClient,
    server_url: &str,
) -> OpcUaResult<Vec<EndpointDescription>> {
    let temporary = open_discovery_channel(client, server_url).await?;
    let result = client.get_endpoints().await;
    finish_discovery(client, server_url, temporary, &result).await;
    result
}

/// Requests the servers known to the server at `server_url`.
///
/// Same channel rules and error reporting as [`discover_endpoints`].
pub async fn find_servers(
    client: &mut dyn UaClient,
    server_url: &str,
    request: &FindServersRequest,
) -> OpcUaResult<Vec<ApplicationDescription>> {
    let temporary = open_discovery_channel(client, server_url).await?;
    let result = client.find_servers(request).await;
    finish_discovery(client, server_url, temporary, &result).await;
    result
}

/// Requests the servers the discovery server at `server_url` has seen
/// on the network.
///
/// Same channel rules and error reporting as [`discover_endpoints`].
pub async fn find_servers_on_network(
    client: &mut dyn UaClient,
    server_url: &str,
    request: &FindServersOnNetworkRequest,
) -> OpcUaResult<Vec<ServerOnNetwork>> {
    let temporary = open_discovery_channel(client, server_url).await?;
    let result = client.find_servers_on_network(request).await;
    finish_discovery(client, server_url, temporary, &result).await;
    result
}

/// Makes sure a channel to `server_url` is open. Returns `true` when it
/// was opened here and must be closed after the request.
async fn open_discovery_channel(
    client: &mut dyn UaClient,
    server_url: &str,
) -> OpcUaResult<bool> {
    if client.is_connected() {
        let current = client.connected_endpoint().unwrap_or_default();
        if !server_url.starts_with(current) {
            return Err(OpcUaError::discovery(DiscoveryError::connected_elsewhere(
                current, server_url,
            )));
        }
        return Ok(false);
    }

    client.connect_secure_channel(server_url).await?;
    Ok(true)
}

async fn finish_discovery<T>(
    client: &mut dyn UaClient,
    server_url: &str,
    temporary: bool,
    result: &OpcUaResult<T>,
) {
    if let Err(OpcUaError::Discovery(DiscoveryError::RequestFailed {
        service, status, ..
    })) = result
    {
        tracing::error!(
            endpoint = %server_url,
            status = %status,
            "{}Request failed with error code {}",
            service,
            status.name()
        );
    }

    if temporary {
        if let Err(e) = client.disconnect().await {
            e.log("discovery disconnect");
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
    fn test_security_policy_name() {
        let mut endpoint = EndpointDescription::unsecured("opc.tcp://localhost:4840");
        assert_eq!(endpoint.security_policy_name(), "None");

        endpoint.security_policy_uri = "urn:custom".to_string();
        assert_eq!(endpoint.security_policy_name(), "urn:custom");
    }

    #[test]
    fn test_certificate_base64() {
        let mut endpoint = EndpointDescription::unsecured("opc.tcp://localhost:4840");
        assert_eq!(endpoint.certificate_base64(), None);

        endpoint.server_certificate = b"cert".to_vec();
        assert_eq!(endpoint.certificate_base64().as_deref(), Some("Y2VydA=="));
    }

    #[test]
    fn test_application_type_from_value() {
        assert_eq!(ApplicationType::from_value(3), ApplicationType::DiscoveryServer);
        assert_eq!(ApplicationType::from_value(1), ApplicationType::Client);
        assert_eq!(ApplicationType::from_value(99), ApplicationType::Server);
    }

    #[test]
    fn test_display() {
        let endpoint = EndpointDescription {
            endpoint_url: "opc.tcp://plc:4840".to_string(),
            security_mode: SecurityMode::SignAndEncrypt,
            security_policy_uri: format!("{}Basic256Sha256", SECURITY_POLICY_URI_PREFIX),
            security_level: 3,
            transport_profile_uri: String::new(),
            server_certificate: Vec::new(),
        };
        assert_eq!(
            endpoint.to_string(),
            "opc.tcp://plc:4840 [SignAndEncrypt / Basic256Sha256, level 3]"
        );
    }
}
