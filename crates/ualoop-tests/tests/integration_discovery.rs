// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Discovery Integration Tests
//!
//! `discover_endpoints`, `find_servers` and `find_servers_on_network`
//! against a scripted client in each connection state.

use ualoop_opcua::{
    discover_endpoints, find_servers, find_servers_on_network, ApplicationDescription,
    ApplicationType, DiscoveryError, DiscoveryService, EndpointDescription,
    FindServersOnNetworkRequest, FindServersRequest, OpcUaError, SecurityMode, ServerOnNetwork,
    StatusCode, UaClient,
};
use ualoop_tests::prelude::*;

const SERVER: &str = "opc.tcp://localhost:4840";

fn endpoints() -> Vec<EndpointDescription> {
    let mut signed = EndpointDescription::unsecured(SERVER);
    signed.security_mode = SecurityMode::Sign;
    signed.security_level = 2;
    vec![EndpointDescription::unsecured(SERVER), signed]
}

fn application(uri: &str, name: &str) -> ApplicationDescription {
    ApplicationDescription {
        application_uri: uri.to_string(),
        product_uri: String::new(),
        application_name: name.to_string(),
        application_type: ApplicationType::Server,
        discovery_urls: vec![SERVER.to_string()],
    }
}

fn announced(record_id: u32, name: &str) -> ServerOnNetwork {
    ServerOnNetwork {
        record_id,
        server_name: name.to_string(),
        discovery_url: format!("opc.tcp://{}:4840", name),
        server_capabilities: vec!["DA".to_string()],
    }
}

// =============================================================================
// GetEndpoints
// =============================================================================

#[tokio::test]
async fn test_discovery_opens_and_closes_channel() {
    let mut client = ScriptedClient::new().with_endpoints(endpoints());
    let calls = client.call_log();

    let found = discover_endpoints(&mut client, SERVER).await.unwrap();

    assert_eq!(found, endpoints());
    assert_eq!(
        calls.calls(),
        vec![
            Call::ConnectSecureChannel(SERVER.to_string()),
            Call::GetEndpoints,
            Call::Disconnect,
        ]
    );
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_discovery_reuses_open_channel() {
    let mut client = ScriptedClient::new()
        .with_endpoints(endpoints())
        .connected_to(SERVER);
    let calls = client.call_log();

    let found = discover_endpoints(&mut client, SERVER).await.unwrap();

    assert_eq!(found.len(), 2);
    assert_eq!(calls.calls(), vec![Call::GetEndpoints]);
    assert!(client.is_connected());
}

#[tokio::test]
async fn test_discovery_accepts_longer_url_of_same_server() {
    let mut client = ScriptedClient::new()
        .with_endpoints(endpoints())
        .connected_to(SERVER);

    let found = discover_endpoints(&mut client, "opc.tcp://localhost:4840/discovery").await;

    assert!(found.is_ok());
    assert!(client.is_connected());
}

#[tokio::test]
async fn test_discovery_rejects_other_server() {
    let mut client = ScriptedClient::new().connected_to("opc.tcp://plc-a:4840");
    let calls = client.call_log();

    let err = discover_endpoints(&mut client, "opc.tcp://plc-b:4840")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OpcUaError::Discovery(DiscoveryError::ConnectedElsewhere { .. })
    ));
    assert_eq!(err.status_code(), Some(StatusCode::BAD_INVALID_ARGUMENT));
    assert!(calls.calls().is_empty());
    assert_eq!(client.connected_endpoint(), Some("opc.tcp://plc-a:4840"));
}

#[tokio::test]
async fn test_discovery_request_failure_still_disconnects() {
    let mut client = ScriptedClient::new().fail_get_endpoints(StatusCode::BAD_TIMEOUT);
    let calls = client.call_log();

    let err = discover_endpoints(&mut client, SERVER).await.unwrap_err();

    assert_eq!(err.status_code(), Some(StatusCode::BAD_TIMEOUT));
    assert_eq!(calls.disconnects(), 1);
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_discovery_channel_failure() {
    let mut client = ScriptedClient::new().fail_connects(1);
    let calls = client.call_log();

    let err = discover_endpoints(&mut client, SERVER).await.unwrap_err();

    assert!(matches!(err, OpcUaError::Connection(_)));
    assert_eq!(calls.calls(), vec![Call::ConnectSecureChannel(SERVER.to_string())]);
}

// =============================================================================
// FindServers
// =============================================================================

#[tokio::test]
async fn test_find_servers_opens_and_closes_channel() {
    let mut client = ScriptedClient::new().with_servers(vec![
        application("urn:plc-a", "PLC A"),
        application("urn:plc-b", "PLC B"),
    ]);
    let calls = client.call_log();

    let request = FindServersRequest {
        server_uris: vec!["urn:plc-b".to_string()],
        locale_ids: Vec::new(),
    };
    let found = find_servers(&mut client, SERVER, &request).await.unwrap();

    assert_eq!(found, vec![application("urn:plc-b", "PLC B")]);
    assert_eq!(
        calls.calls(),
        vec![
            Call::ConnectSecureChannel(SERVER.to_string()),
            Call::FindServers(request),
            Call::Disconnect,
        ]
    );
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_find_servers_reuses_open_channel() {
    let mut client = ScriptedClient::new()
        .with_servers(vec![application("urn:plc-a", "PLC A")])
        .connected_to(SERVER);
    let calls = client.call_log();

    let found = find_servers(&mut client, SERVER, &FindServersRequest::default())
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(
        calls.calls(),
        vec![Call::FindServers(FindServersRequest::default())]
    );
    assert!(client.is_connected());
}

#[tokio::test]
async fn test_find_servers_rejects_other_server() {
    let mut client = ScriptedClient::new().connected_to("opc.tcp://plc-a:4840");
    let calls = client.call_log();

    let err = find_servers(&mut client, "opc.tcp://lds:4840", &FindServersRequest::default())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(StatusCode::BAD_INVALID_ARGUMENT));
    assert!(calls.calls().is_empty());
    assert!(client.is_connected());
}

#[tokio::test]
async fn test_find_servers_failure_still_disconnects() {
    let mut client = ScriptedClient::new()
        .fail_discovery(DiscoveryService::FindServers, StatusCode::BAD_TIMEOUT);
    let calls = client.call_log();

    let err = find_servers(&mut client, SERVER, &FindServersRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OpcUaError::Discovery(DiscoveryError::RequestFailed {
            service: DiscoveryService::FindServers,
            ..
        })
    ));
    assert_eq!(calls.disconnects(), 1);
    assert!(!client.is_connected());
}

// =============================================================================
// FindServersOnNetwork
// =============================================================================

#[tokio::test]
async fn test_find_servers_on_network_pages_records() {
    let mut client = ScriptedClient::new().with_servers_on_network(vec![
        announced(1, "plc-a"),
        announced(2, "plc-b"),
        announced(3, "plc-c"),
    ]);
    let calls = client.call_log();

    let request = FindServersOnNetworkRequest {
        starting_record_id: 2,
        max_records_to_return: 1,
        server_capability_filter: Vec::new(),
    };
    let found = find_servers_on_network(&mut client, SERVER, &request)
        .await
        .unwrap();

    assert_eq!(found, vec![announced(2, "plc-b")]);
    assert_eq!(calls.disconnects(), 1);
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_find_servers_on_network_rejects_other_server() {
    let mut client = ScriptedClient::new().connected_to("opc.tcp://plc-a:4840");

    let err = find_servers_on_network(
        &mut client,
        "opc.tcp://lds:4840",
        &FindServersOnNetworkRequest::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        OpcUaError::Discovery(DiscoveryError::ConnectedElsewhere { .. })
    ));
    assert_eq!(client.connected_endpoint(), Some("opc.tcp://plc-a:4840"));
}

#[tokio::test]
async fn test_find_servers_on_network_unsupported_still_disconnects() {
    let mut client = ScriptedClient::new().fail_discovery(
        DiscoveryService::FindServersOnNetwork,
        StatusCode::BAD_SERVICE_UNSUPPORTED,
    );
    let calls = client.call_log();

    let err = find_servers_on_network(&mut client, SERVER, &FindServersOnNetworkRequest::default())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(StatusCode::BAD_SERVICE_UNSUPPORTED));
    assert_eq!(
        calls.calls(),
        vec![
            Call::ConnectSecureChannel(SERVER.to_string()),
            Call::FindServersOnNetwork(FindServersOnNetworkRequest::default()),
            Call::Disconnect,
        ]
    );
}
