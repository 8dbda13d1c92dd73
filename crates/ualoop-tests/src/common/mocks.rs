// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! [`ScriptedClient`] implements `UaClient` without a network. Its
//! behaviour is set up front:
//!
//! - connect outcomes are consumed in order, then connects succeed;
//! - each iteration returns the queued state changes followed by the next
//!   scripted batch;
//! - iterations can be made to fail outright;
//! - subscription, monitored item and discovery requests can be made to
//!   fail with a given status.
//!
//! Every call is appended to a shared [`CallLog`] for verification.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use ualoop_bin::ShutdownToken;
use ualoop_opcua::{
    ApplicationDescription, ClientEvent, ClientHandle, ClientSettings, ConnectionError,
    CreateSubscriptionRequest, CreateSubscriptionResponse, DiscoveryError, DiscoveryService,
    EndpointDescription, FindServersOnNetworkRequest, FindServersRequest,
    MonitoredItemCreateRequest, MonitoredItemCreateResult, MonitoredItemId, NodeId, OpcUaError,
    OpcUaResult, SecureChannelState, ServerOnNetwork, SessionState, StatusCode,
    SubscriptionError, SubscriptionId, TimestampsToReturn, UaClient,
};

// =============================================================================
// Call Log
// =============================================================================

/// One recorded client call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// `connect(endpoint)`.
    Connect(String),
    /// `connect_secure_channel(endpoint)`.
    ConnectSecureChannel(String),
    /// `disconnect()`.
    Disconnect,
    /// `run_iterate(timeout)`.
    Iterate(Duration),
    /// `get_endpoints()`.
    GetEndpoints,
    /// `find_servers(request)`.
    FindServers(FindServersRequest),
    /// `find_servers_on_network(request)`.
    FindServersOnNetwork(FindServersOnNetworkRequest),
    /// `create_subscription(request)`.
    CreateSubscription,
    /// `create_monitored_item(..)`.
    CreateMonitoredItem {
        /// Target subscription.
        subscription_id: SubscriptionId,
        /// Requested timestamps.
        timestamps: TimestampsToReturn,
        /// Requested client handle.
        client_handle: ClientHandle,
        /// Monitored node.
        node_id: NodeId,
    },
}

/// Shared, cloneable record of client calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl CallLog {
    fn push(&self, call: Call) {
        self.calls.lock().push(call);
    }

    /// Returns all calls so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Number of calls matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().iter().filter(|&c| predicate(c)).count()
    }

    /// Number of `connect` calls.
    pub fn connects(&self) -> usize {
        self.count(|c| matches!(c, Call::Connect(_)))
    }

    /// Number of `run_iterate` calls.
    pub fn iterations(&self) -> usize {
        self.count(|c| matches!(c, Call::Iterate(_)))
    }

    /// Number of `disconnect` calls.
    pub fn disconnects(&self) -> usize {
        self.count(|c| matches!(c, Call::Disconnect))
    }

    /// Number of `create_subscription` calls.
    pub fn subscription_requests(&self) -> usize {
        self.count(|c| matches!(c, Call::CreateSubscription))
    }

    /// All `create_monitored_item` calls.
    pub fn monitored_item_requests(&self) -> Vec<Call> {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, Call::CreateMonitoredItem { .. }))
            .cloned()
            .collect()
    }

    /// Index of the first call matching `predicate`.
    pub fn position(&self, predicate: impl Fn(&Call) -> bool) -> Option<usize> {
        self.calls.lock().iter().position(|c| predicate(c))
    }

    /// Forgets all calls.
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

// =============================================================================
// ScriptedClient
// =============================================================================

/// A `UaClient` that follows a script.
#[derive(Debug)]
pub struct ScriptedClient {
    settings: ClientSettings,

    channel: SecureChannelState,
    session: SessionState,
    endpoint: Option<String>,

    /// Outcomes for upcoming connect attempts. Empty means success.
    connect_script: VecDeque<OpcUaResult<()>>,

    /// State changes waiting for the next iteration.
    pending: VecDeque<ClientEvent>,

    /// One batch per upcoming iteration.
    iterate_script: VecDeque<Vec<ClientEvent>>,

    subscription_failure: Option<StatusCode>,
    monitored_item_failure: Option<StatusCode>,
    endpoints: Vec<EndpointDescription>,
    servers: Vec<ApplicationDescription>,
    servers_on_network: Vec<ServerOnNetwork>,
    discovery_failure: Option<(DiscoveryService, StatusCode)>,
    iterate_failures: usize,

    stop_after: Option<(u64, ShutdownToken)>,
    lose_connection_at: Option<u64>,
    iterations: u64,
    next_subscription_id: u32,
    next_monitored_item_id: u32,

    calls: CallLog,
}

impl ScriptedClient {
    /// Creates a client whose connects always succeed.
    pub fn new() -> Self {
        Self {
            settings: ClientSettings::default(),
            channel: SecureChannelState::Closed,
            session: SessionState::Closed,
            endpoint: None,
            connect_script: VecDeque::new(),
            pending: VecDeque::new(),
            iterate_script: VecDeque::new(),
            subscription_failure: None,
            monitored_item_failure: None,
            endpoints: Vec::new(),
            servers: Vec::new(),
            servers_on_network: Vec::new(),
            discovery_failure: None,
            iterate_failures: 0,
            stop_after: None,
            lose_connection_at: None,
            iterations: 0,
            next_subscription_id: 1,
            next_monitored_item_id: 1,
            calls: CallLog::default(),
        }
    }

    /// Makes the next `count` connect attempts fail with a refusal.
    pub fn fail_connects(mut self, count: usize) -> Self {
        for _ in 0..count {
            self.connect_script
                .push_back(Err(OpcUaError::connection_refused("opc.tcp://localhost:4840")));
        }
        self
    }

    /// Makes the next connect attempt fail by timing out.
    pub fn time_out_connect(mut self, duration: Duration) -> Self {
        self.connect_script.push_back(Err(OpcUaError::connection(
            ConnectionError::timed_out("opc.tcp://localhost:4840", duration),
        )));
        self
    }

    /// Appends a batch returned by an upcoming iteration.
    pub fn on_iteration(mut self, events: Vec<ClientEvent>) -> Self {
        self.iterate_script.push_back(events);
        self
    }

    /// Rejects subscription requests with `status`.
    pub fn fail_subscriptions(mut self, status: StatusCode) -> Self {
        self.subscription_failure = Some(status);
        self
    }

    /// Rejects monitored item requests with `status`.
    pub fn fail_monitored_items(mut self, status: StatusCode) -> Self {
        self.monitored_item_failure = Some(status);
        self
    }

    /// Sets the endpoints returned by GetEndpoints.
    pub fn with_endpoints(mut self, endpoints: Vec<EndpointDescription>) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Fails GetEndpoints with `status`.
    pub fn fail_get_endpoints(self, status: StatusCode) -> Self {
        self.fail_discovery(DiscoveryService::GetEndpoints, status)
    }

    /// Sets the applications returned by FindServers.
    pub fn with_servers(mut self, servers: Vec<ApplicationDescription>) -> Self {
        self.servers = servers;
        self
    }

    /// Sets the records returned by FindServersOnNetwork.
    pub fn with_servers_on_network(mut self, servers: Vec<ServerOnNetwork>) -> Self {
        self.servers_on_network = servers;
        self
    }

    /// Fails the given discovery service with `status`.
    pub fn fail_discovery(mut self, service: DiscoveryService, status: StatusCode) -> Self {
        self.discovery_failure = Some((service, status));
        self
    }

    /// Makes the next `count` iterations fail immediately.
    pub fn fail_iterations(mut self, count: usize) -> Self {
        self.iterate_failures = count;
        self
    }

    /// Requests shutdown through `token` during iteration `count`.
    pub fn stop_after_iterations(mut self, count: u64, token: ShutdownToken) -> Self {
        self.stop_after = Some((count, token));
        self
    }

    /// Drops the connection at the end of iteration `count`.
    pub fn lose_connection_after_iteration(mut self, count: u64) -> Self {
        self.lose_connection_at = Some(count);
        self
    }

    /// Puts the client in the connected state without recording a call.
    pub fn connected_to(mut self, endpoint: &str) -> Self {
        self.channel = SecureChannelState::Open;
        self.session = SessionState::Activated;
        self.endpoint = Some(endpoint.to_string());
        self
    }

    /// Returns a handle on the call log.
    pub fn call_log(&self) -> CallLog {
        self.calls.clone()
    }

    /// Simulates a connection loss seen by the stack.
    pub fn drop_connection(&mut self) {
        self.set_state(SecureChannelState::Closed, SessionState::Closed);
        self.endpoint = None;
    }

    fn check_stop(&self) {
        if let Some((count, token)) = &self.stop_after {
            if self.iterations >= *count {
                token.request_shutdown();
            }
        }
    }

    fn set_state(&mut self, channel: SecureChannelState, session: SessionState) {
        if channel != self.channel || session != self.session {
            self.channel = channel;
            self.session = session;
            self.pending
                .push_back(ClientEvent::state_changed(channel, session));
        }
    }

    fn next_connect_outcome(&mut self) -> OpcUaResult<()> {
        self.connect_script.pop_front().unwrap_or(Ok(()))
    }

    /// Checks the channel and the scripted failure of `service`.
    fn discovery_call<T: Clone>(
        &self,
        service: DiscoveryService,
        answer: &[T],
    ) -> OpcUaResult<Vec<T>> {
        let url = match &self.endpoint {
            Some(url) if self.channel.is_open() => url.clone(),
            _ => return Err(OpcUaError::not_connected()),
        };

        match self.discovery_failure {
            Some((failing, status)) if failing == service => Err(OpcUaError::discovery(
                DiscoveryError::request_failed(service, url, status),
            )),
            _ => Ok(answer.to_vec()),
        }
    }
}

impl Default for ScriptedClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UaClient for ScriptedClient {
    fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    fn channel_state(&self) -> SecureChannelState {
        self.channel
    }

    fn session_state(&self) -> SessionState {
        self.session
    }

    fn connected_endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    async fn connect(&mut self, endpoint: &str) -> OpcUaResult<()> {
        self.calls.push(Call::Connect(endpoint.to_string()));

        if self.session.is_activated() && self.endpoint.as_deref() == Some(endpoint) {
            return Ok(());
        }

        self.next_connect_outcome()?;
        self.endpoint = Some(endpoint.to_string());
        self.set_state(SecureChannelState::Open, SessionState::Activated);
        Ok(())
    }

    async fn connect_secure_channel(&mut self, endpoint: &str) -> OpcUaResult<()> {
        self.calls.push(Call::ConnectSecureChannel(endpoint.to_string()));

        self.next_connect_outcome()?;
        self.endpoint = Some(endpoint.to_string());
        self.set_state(SecureChannelState::Open, SessionState::Closed);
        Ok(())
    }

    async fn disconnect(&mut self) -> OpcUaResult<()> {
        self.calls.push(Call::Disconnect);
        self.drop_connection();
        Ok(())
    }

    async fn run_iterate(&mut self, timeout: Duration) -> OpcUaResult<Vec<ClientEvent>> {
        self.calls.push(Call::Iterate(timeout));
        self.iterations += 1;

        if self.iterate_failures > 0 {
            self.iterate_failures -= 1;
            self.check_stop();
            return Err(OpcUaError::connection(ConnectionError::closed(Some(
                "scripted iterate failure".to_string(),
            ))));
        }

        let mut events: Vec<ClientEvent> = self.pending.drain(..).collect();
        if let Some(batch) = self.iterate_script.pop_front() {
            events.extend(batch);
        }

        if self.lose_connection_at == Some(self.iterations) {
            self.drop_connection();
        }

        self.check_stop();
        Ok(events)
    }

    async fn get_endpoints(&mut self) -> OpcUaResult<Vec<EndpointDescription>> {
        self.calls.push(Call::GetEndpoints);
        self.discovery_call(DiscoveryService::GetEndpoints, &self.endpoints)
    }

    async fn find_servers(
        &mut self,
        request: &FindServersRequest,
    ) -> OpcUaResult<Vec<ApplicationDescription>> {
        self.calls.push(Call::FindServers(request.clone()));
        let servers = self.discovery_call(DiscoveryService::FindServers, &self.servers)?;
        Ok(servers
            .into_iter()
            .filter(|app| {
                request.server_uris.is_empty() || request.server_uris.contains(&app.application_uri)
            })
            .collect())
    }

    async fn find_servers_on_network(
        &mut self,
        request: &FindServersOnNetworkRequest,
    ) -> OpcUaResult<Vec<ServerOnNetwork>> {
        self.calls.push(Call::FindServersOnNetwork(request.clone()));
        let records = self.discovery_call(
            DiscoveryService::FindServersOnNetwork,
            &self.servers_on_network,
        )?;
        let limit = match request.max_records_to_return {
            0 => usize::MAX,
            n => n as usize,
        };
        Ok(records
            .into_iter()
            .filter(|r| r.record_id >= request.starting_record_id)
            .take(limit)
            .collect())
    }

    async fn create_subscription(
        &mut self,
        request: CreateSubscriptionRequest,
    ) -> OpcUaResult<CreateSubscriptionResponse> {
        self.calls.push(Call::CreateSubscription);

        if let Some(status) = self.subscription_failure {
            return Err(OpcUaError::subscription(SubscriptionError::creation_failed(
                status,
            )));
        }

        let id = SubscriptionId::new(self.next_subscription_id);
        self.next_subscription_id += 1;
        Ok(CreateSubscriptionResponse::granted(id, &request))
    }

    async fn create_monitored_item(
        &mut self,
        subscription_id: SubscriptionId,
        timestamps: TimestampsToReturn,
        request: MonitoredItemCreateRequest,
    ) -> OpcUaResult<MonitoredItemCreateResult> {
        self.calls.push(Call::CreateMonitoredItem {
            subscription_id,
            timestamps,
            client_handle: request.client_handle(),
            node_id: request.node_id().clone(),
        });

        if let Some(status) = self.monitored_item_failure {
            return Err(OpcUaError::subscription(
                SubscriptionError::monitored_item_failed(request.node_id().to_string(), status),
            ));
        }

        let id = MonitoredItemId::new(self.next_monitored_item_id);
        self.next_monitored_item_id += 1;
        Ok(MonitoredItemCreateResult::granted(id, &request))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_connects() {
        let mut client = ScriptedClient::new().fail_connects(1);

        assert!(client.connect("opc.tcp://a:4840").await.is_err());
        assert!(!client.is_connected());

        client.connect("opc.tcp://a:4840").await.unwrap();
        assert!(client.is_connected());
        assert_eq!(client.connected_endpoint(), Some("opc.tcp://a:4840"));

        let events = client.run_iterate(Duration::from_secs(1)).await.unwrap();
        assert_eq!(
            events,
            vec![ClientEvent::state_changed(
                SecureChannelState::Open,
                SessionState::Activated
            )]
        );

        // already connected: no new state change
        client.connect("opc.tcp://a:4840").await.unwrap();
        assert!(client.run_iterate(Duration::from_secs(1)).await.unwrap().is_empty());
        assert_eq!(client.call_log().connects(), 3);
    }

    #[tokio::test]
    async fn test_stop_after_iterations() {
        let token = ShutdownToken::new();
        let mut client = ScriptedClient::new().stop_after_iterations(2, token.clone());

        client.run_iterate(Duration::ZERO).await.unwrap();
        assert!(!token.is_shutdown_requested());
        client.run_iterate(Duration::ZERO).await.unwrap();
        assert!(token.is_shutdown_requested());
    }
}
