// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! `UaClient` backed by the `opcua` crate.
//!
//! The `opcua` client API is blocking, so every call into it runs on the
//! blocking thread pool. Its callbacks (data change, connection status,
//! session closed) fire on the crate's own threads and only push
//! [`ClientEvent`]s into a shared queue. [`RealUaClient::run_iterate`]
//! drains that queue, which keeps delivery on the caller's task.
//!
//! The crate performs the HEL/ACK and OPN handshakes and session
//! activation in one call, so a successful connect is reported as a
//! single transition to `Open`/`Activated`. It does not surface
//! subscription deletion or inactivity; this backend never emits those
//! events. It has no FindServersOnNetwork either, which this backend
//! answers with `BadServiceUnsupported`.
//!
//! # Example
//!
//! ```rust,ignore
//! use ualoop_opcua::client::{RealUaClient, UaClient};
//! use ualoop_opcua::types::ClientSettings;
//!
//! let mut client = RealUaClient::new(ClientSettings::default());
//! client.connect("opc.tcp://localhost:4840").await?;
//! let events = client.run_iterate(Duration::from_secs(1)).await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use opcua::client::prelude::{
    AttributeId as UaAttributeId, Client, ClientBuilder, ConnectionStatusCallback,
    DataChangeCallback, DiscoveryService, ExtensionObject, IdentityToken, MessageSecurityMode,
    MonitoredItem as UaMonitoredItem, MonitoredItemService, MonitoringMode as UaMonitoringMode,
    MonitoringParameters as UaMonitoringParameters, SecurityPolicy, Session, SessionCommand,
    SessionClosedCallback, SubscriptionService, TimestampsToReturn as UaTimestampsToReturn,
    UserTokenPolicy,
};
use opcua::sync::RwLock as OpcUaRwLock;

use crate::client::conversion::ua_ticks_to_datetime;
use crate::client::discovery::{
    ApplicationDescription, ApplicationType, EndpointDescription, FindServersOnNetworkRequest,
    FindServersRequest, ServerOnNetwork,
};
use crate::client::events::ClientEvent;
use crate::client::state::{SecureChannelState, SessionState};
use crate::client::subscription::{
    CreateSubscriptionRequest, CreateSubscriptionResponse, DataChangeNotification,
    MonitoredItemCreateRequest, MonitoredItemCreateResult, MonitoredItemId,
    MonitoredItemNotification, SubscriptionId,
};
use crate::client::transport::{DataValue, OpcUaValue, UaClient};
use crate::error::{
    ConnectionError, DiscoveryError, DiscoveryService as Service, OpcUaError, OpcUaResult,
    SubscriptionError, TimeoutError,
};
use crate::types::{
    ClientSettings, MonitoringMode, NodeId, NodeIdentifier, SecurityMode, StatusCode,
    TimestampsToReturn,
};

/// Poll step while waiting for queued events.
const QUEUE_POLL_INTERVAL: Duration = Duration::from_millis(20);

type EventQueue = Arc<Mutex<Vec<ClientEvent>>>;

/// Subscription id as seen by a data change callback.
///
/// A publish response can be processed before `create_subscription`
/// returns the id; its batches wait in `Pending` until the id is known.
enum SubscriptionSlot {
    Pending(Vec<Vec<MonitoredItemNotification>>),
    Known(SubscriptionId),
}

impl SubscriptionSlot {
    /// Queues `batch` under the known id, or holds it back.
    fn deliver(&mut self, events: &EventQueue, batch: Vec<MonitoredItemNotification>) {
        match self {
            Self::Known(id) => events
                .lock()
                .push(ClientEvent::DataChange(DataChangeNotification::new(*id, batch))),
            Self::Pending(held) => held.push(batch),
        }
    }

    /// Records the id and releases the held batches in arrival order.
    fn resolve(&mut self, events: &EventQueue, id: SubscriptionId) {
        if let Self::Pending(held) = std::mem::replace(self, Self::Known(id)) {
            let mut queue = events.lock();
            for batch in held {
                queue.push(ClientEvent::DataChange(DataChangeNotification::new(id, batch)));
            }
        }
    }
}

// =============================================================================
// RealUaClient
// =============================================================================

/// OPC UA client over the `opcua` crate.
pub struct RealUaClient {
    settings: ClientSettings,
    session: Option<Arc<OpcUaRwLock<Session>>>,
    session_runner: Option<tokio::sync::oneshot::Sender<SessionCommand>>,
    endpoint: Option<String>,
    channel: SecureChannelState,
    session_state: SessionState,
    events: EventQueue,
}

impl RealUaClient {
    /// Creates a disconnected client.
    pub fn new(settings: ClientSettings) -> Self {
        Self {
            settings,
            session: None,
            session_runner: None,
            endpoint: None,
            channel: SecureChannelState::Closed,
            session_state: SessionState::Closed,
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn build_client(settings: &ClientSettings) -> OpcUaResult<Client> {
        ClientBuilder::new()
            .application_name(settings.application_name.as_str())
            .application_uri(settings.application_uri.as_str())
            .trust_server_certs(true)
            .session_retry_limit(0)
            .session_timeout(settings.session_timeout.as_millis() as u32)
            .client()
            .ok_or_else(|| {
                OpcUaError::connection(ConnectionError::invalid_endpoint(
                    &settings.endpoint,
                    "Failed to build OPC UA client",
                ))
            })
    }

    /// Records a state transition and queues it if it differs from the
    /// current one.
    fn transition(&mut self, channel: SecureChannelState, session: SessionState) {
        if self.channel == channel && self.session_state == session {
            return;
        }
        self.channel = channel;
        self.session_state = session;
        self.events
            .lock()
            .push(ClientEvent::state_changed(channel, session));
    }

    fn session(&self) -> OpcUaResult<Arc<OpcUaRwLock<Session>>> {
        self.session.clone().ok_or_else(OpcUaError::not_connected)
    }

    /// Drops the session after the library reported it lost.
    fn detect_lost_session(&mut self) {
        let lost = match &self.session {
            Some(session) => !session.read().is_connected(),
            None => false,
        };
        if lost {
            warn!(endpoint = ?self.endpoint, "Connection to the server was lost");
            self.session = None;
            self.session_runner = None;
            self.endpoint = None;
            self.transition(SecureChannelState::Closed, SessionState::Closed);
        }
    }

    fn to_opcua_node_id(node_id: &NodeId) -> opcua::types::NodeId {
        match &node_id.identifier {
            NodeIdentifier::Numeric(v) => opcua::types::NodeId::new(node_id.namespace_index, *v),
            NodeIdentifier::String(v) => {
                opcua::types::NodeId::new(node_id.namespace_index, v.clone())
            }
            NodeIdentifier::Guid(v) => {
                opcua::types::NodeId::new(node_id.namespace_index, opcua::types::Guid::from(*v))
            }
            NodeIdentifier::Opaque(v) => opcua::types::NodeId::new(
                node_id.namespace_index,
                opcua::types::ByteString::from(v.as_slice()),
            ),
        }
    }

    fn from_opcua_variant(variant: &opcua::types::Variant) -> OpcUaValue {
        use opcua::types::Variant;

        match variant {
            Variant::Empty => OpcUaValue::Null,
            Variant::Boolean(v) => OpcUaValue::Boolean(*v),
            Variant::SByte(v) => OpcUaValue::Int32(i32::from(*v)),
            Variant::Byte(v) => OpcUaValue::UInt32(u32::from(*v)),
            Variant::Int16(v) => OpcUaValue::Int32(i32::from(*v)),
            Variant::UInt16(v) => OpcUaValue::UInt32(u32::from(*v)),
            Variant::Int32(v) => OpcUaValue::Int32(*v),
            Variant::UInt32(v) => OpcUaValue::UInt32(*v),
            Variant::Int64(v) => OpcUaValue::Int64(*v),
            Variant::UInt64(v) => OpcUaValue::UInt64(*v),
            Variant::Float(v) => OpcUaValue::Float(*v),
            Variant::Double(v) => OpcUaValue::Double(*v),
            Variant::String(v) => OpcUaValue::String(v.as_ref().to_string()),
            Variant::DateTime(v) => ua_ticks_to_datetime(v.ticks())
                .map(OpcUaValue::DateTime)
                .unwrap_or(OpcUaValue::Null),
            Variant::ByteString(v) => OpcUaValue::ByteString(v.value.clone().unwrap_or_default()),
            Variant::StatusCode(v) => OpcUaValue::StatusCode(StatusCode(v.bits())),
            Variant::Array(arr) => {
                OpcUaValue::Array(arr.values.iter().map(Self::from_opcua_variant).collect())
            }
            other => OpcUaValue::String(format!("{:?}", other)),
        }
    }

    fn from_opcua_data_value(value: &opcua::types::DataValue) -> DataValue {
        let timestamp = |ts: &Option<opcua::types::DateTime>| {
            ts.as_ref().and_then(|dt| ua_ticks_to_datetime(dt.ticks()))
        };
        DataValue {
            value: value
                .value
                .as_ref()
                .map(Self::from_opcua_variant)
                .unwrap_or_default(),
            status: value
                .status
                .map(|s| StatusCode(s.bits()))
                .unwrap_or(StatusCode::GOOD),
            source_timestamp: timestamp(&value.source_timestamp),
            server_timestamp: timestamp(&value.server_timestamp),
        }
    }

    fn from_opcua_endpoint(endpoint: &opcua::types::EndpointDescription) -> EndpointDescription {
        EndpointDescription {
            endpoint_url: endpoint.endpoint_url.as_ref().to_string(),
            security_mode: SecurityMode::from_value(endpoint.security_mode as u32),
            security_policy_uri: endpoint.security_policy_uri.as_ref().to_string(),
            security_level: endpoint.security_level,
            transport_profile_uri: endpoint.transport_profile_uri.as_ref().to_string(),
            server_certificate: endpoint.server_certificate.value.clone().unwrap_or_default(),
        }
    }

    fn from_opcua_application(
        application: &opcua::types::ApplicationDescription,
    ) -> ApplicationDescription {
        ApplicationDescription {
            application_uri: application.application_uri.as_ref().to_string(),
            product_uri: application.product_uri.as_ref().to_string(),
            application_name: application.application_name.text.as_ref().to_string(),
            application_type: ApplicationType::from_value(application.application_type as u32),
            discovery_urls: application
                .discovery_urls
                .as_ref()
                .map(|urls| urls.iter().map(|u| u.as_ref().to_string()).collect())
                .unwrap_or_default(),
        }
    }

    fn discovery_url(&self) -> OpcUaResult<String> {
        self.endpoint.clone().ok_or_else(OpcUaError::not_connected)
    }

    fn to_opcua_timestamps(timestamps: TimestampsToReturn) -> UaTimestampsToReturn {
        match timestamps {
            TimestampsToReturn::Source => UaTimestampsToReturn::Source,
            TimestampsToReturn::Server => UaTimestampsToReturn::Server,
            TimestampsToReturn::Both => UaTimestampsToReturn::Both,
            TimestampsToReturn::Neither => UaTimestampsToReturn::Neither,
        }
    }

    fn to_opcua_monitoring_mode(mode: MonitoringMode) -> UaMonitoringMode {
        match mode {
            MonitoringMode::Disabled => UaMonitoringMode::Disabled,
            MonitoringMode::Sampling => UaMonitoringMode::Sampling,
            MonitoringMode::Reporting => UaMonitoringMode::Reporting,
        }
    }
}

/// Runs a blocking `opcua` call on the blocking pool.
async fn blocking<T, F>(call: F) -> OpcUaResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> OpcUaResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(call).await.map_err(|e| {
        OpcUaError::connection(ConnectionError::closed(Some(format!(
            "OPC UA worker failed: {}",
            e
        ))))
    })?
}

#[async_trait]
impl UaClient for RealUaClient {
    fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    fn channel_state(&self) -> SecureChannelState {
        self.channel
    }

    fn session_state(&self) -> SessionState {
        self.session_state
    }

    fn connected_endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    async fn connect(&mut self, endpoint: &str) -> OpcUaResult<()> {
        self.detect_lost_session();
        if self.session.is_some() && self.endpoint.as_deref() == Some(endpoint) {
            return Ok(());
        }
        if self.session.is_some() || self.channel.is_open() {
            self.disconnect().await?;
        }

        debug!(endpoint = %endpoint, "Connecting to OPC UA server");
        self.transition(SecureChannelState::Connecting, SessionState::Closed);

        let settings = self.settings.clone();
        let url = endpoint.to_string();
        let attempt = blocking(move || {
            let mut client = Self::build_client(&settings)?;
            client
                .connect_to_endpoint(
                    (
                        url.as_str(),
                        SecurityPolicy::None.to_str(),
                        MessageSecurityMode::None,
                        UserTokenPolicy::anonymous(),
                    ),
                    IdentityToken::Anonymous,
                )
                .map_err(|status| {
                    OpcUaError::connection(ConnectionError::refused_with_status(
                        url.as_str(),
                        StatusCode(status.bits()),
                    ))
                })
        });

        let session = match tokio::time::timeout(self.settings.connect_timeout, attempt).await {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => {
                self.transition(SecureChannelState::Closed, SessionState::Closed);
                return Err(e);
            }
            Err(_) => {
                self.transition(SecureChannelState::Closed, SessionState::Closed);
                return Err(OpcUaError::timeout(TimeoutError::connection(
                    self.settings.connect_timeout,
                )));
            }
        };

        {
            let events = Arc::clone(&self.events);
            let mut session_guard = session.write();
            session_guard.set_connection_status_callback(ConnectionStatusCallback::new(
                move |connected| {
                    if !connected {
                        events.lock().push(ClientEvent::state_changed(
                            SecureChannelState::Closed,
                            SessionState::Closed,
                        ));
                    }
                },
            ));
            session_guard.set_session_closed_callback(SessionClosedCallback::new(|status| {
                debug!(status = %status, "Session closed by the library");
            }));
        }

        self.session_runner = Some(Session::run_async(Arc::clone(&session)));
        self.session = Some(session);
        self.endpoint = Some(endpoint.to_string());
        self.transition(SecureChannelState::Open, SessionState::Activated);

        info!(endpoint = %endpoint, "Connected to OPC UA server");
        Ok(())
    }

    async fn connect_secure_channel(&mut self, endpoint: &str) -> OpcUaResult<()> {
        // The crate opens its own channel inside each discovery call; only
        // the target is recorded and no channel state is reported.
        self.endpoint = Some(endpoint.to_string());
        Ok(())
    }

    async fn disconnect(&mut self) -> OpcUaResult<()> {
        if let Some(runner) = self.session_runner.take() {
            let _ = runner.send(SessionCommand::Stop);
        }

        if let Some(session) = self.session.take() {
            info!(endpoint = ?self.endpoint, "Disconnecting from OPC UA server");
            blocking(move || {
                session.write().disconnect();
                Ok(())
            })
            .await?;
        }

        self.endpoint = None;
        self.transition(SecureChannelState::Closed, SessionState::Closed);
        Ok(())
    }

    async fn run_iterate(&mut self, timeout: Duration) -> OpcUaResult<Vec<ClientEvent>> {
        let deadline = Instant::now() + timeout;

        loop {
            self.detect_lost_session();

            // Library callbacks may report the same loss already recorded above.
            let drained: Vec<ClientEvent> = std::mem::take(&mut *self.events.lock());
            if !drained.is_empty() {
                trace!(count = drained.len(), "Delivering queued events");
                return Ok(drained);
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(Vec::new());
            }
            tokio::time::sleep(QUEUE_POLL_INTERVAL.min(deadline - now)).await;
        }
    }

    async fn get_endpoints(&mut self) -> OpcUaResult<Vec<EndpointDescription>> {
        let url = self.discovery_url()?;

        let endpoints = match self.session.clone() {
            Some(session) => {
                let url = url.clone();
                blocking(move || {
                    session.read().get_endpoints().map_err(|status| {
                        OpcUaError::discovery(DiscoveryError::request_failed(
                            Service::GetEndpoints,
                            url.as_str(),
                            StatusCode(status.bits()),
                        ))
                    })
                })
                .await?
            }
            None => {
                let settings = self.settings.clone();
                let url = url.clone();
                blocking(move || {
                    let client = Self::build_client(&settings)?;
                    client
                        .get_server_endpoints_from_url(url.as_str())
                        .map_err(|status| {
                            OpcUaError::discovery(DiscoveryError::request_failed(
                                Service::GetEndpoints,
                                url.as_str(),
                                StatusCode(status.bits()),
                            ))
                        })
                })
                .await?
            }
        };

        Ok(endpoints.iter().map(Self::from_opcua_endpoint).collect())
    }

    async fn find_servers(
        &mut self,
        request: &FindServersRequest,
    ) -> OpcUaResult<Vec<ApplicationDescription>> {
        let url = self.discovery_url()?;
        let failed = {
            let url = url.clone();
            move |status: opcua::types::StatusCode| {
                OpcUaError::discovery(DiscoveryError::request_failed(
                    Service::FindServers,
                    url.as_str(),
                    StatusCode(status.bits()),
                ))
            }
        };

        let servers = match self.session.clone() {
            Some(session) => {
                let target = url.clone();
                blocking(move || session.read().find_servers(target).map_err(failed)).await?
            }
            None => {
                let settings = self.settings.clone();
                blocking(move || {
                    let mut client = Self::build_client(&settings)?;
                    client.find_servers(url).map_err(failed)
                })
                .await?
            }
        };

        // The crate sends the request without filters; server URIs are
        // applied here and locale ids are not supported.
        Ok(servers
            .iter()
            .map(Self::from_opcua_application)
            .filter(|app| {
                request.server_uris.is_empty() || request.server_uris.contains(&app.application_uri)
            })
            .collect())
    }

    async fn find_servers_on_network(
        &mut self,
        _request: &FindServersOnNetworkRequest,
    ) -> OpcUaResult<Vec<ServerOnNetwork>> {
        let url = self.discovery_url()?;
        Err(OpcUaError::discovery(DiscoveryError::request_failed(
            Service::FindServersOnNetwork,
            url,
            StatusCode::BAD_SERVICE_UNSUPPORTED,
        )))
    }

    async fn create_subscription(
        &mut self,
        request: CreateSubscriptionRequest,
    ) -> OpcUaResult<CreateSubscriptionResponse> {
        let session = self.session()?;

        let events = Arc::clone(&self.events);
        let slot = Arc::new(Mutex::new(SubscriptionSlot::Pending(Vec::new())));
        let callback_slot = Arc::clone(&slot);
        let callback = DataChangeCallback::new(move |items: &[&UaMonitoredItem]| {
            let batch = items
                .iter()
                .map(|item| {
                    MonitoredItemNotification::new(
                        item.client_handle(),
                        Self::from_opcua_data_value(item.last_value()),
                    )
                })
                .collect();
            callback_slot.lock().deliver(&events, batch);
        });

        let params = request.clone();
        let id = blocking(move || {
            session
                .read()
                .create_subscription(
                    params.requested_publishing_interval.as_millis() as f64,
                    params.requested_lifetime_count,
                    params.requested_max_keep_alive_count,
                    params.max_notifications_per_publish,
                    params.priority,
                    params.publishing_enabled,
                    callback,
                )
                .map_err(|status| {
                    OpcUaError::subscription(SubscriptionError::creation_failed(StatusCode(
                        status.bits(),
                    )))
                })
        })
        .await?;

        slot.lock().resolve(&self.events, SubscriptionId::new(id));
        debug!(subscription_id = id, "Created subscription");
        Ok(CreateSubscriptionResponse::granted(
            SubscriptionId::new(id),
            &request,
        ))
    }

    async fn create_monitored_item(
        &mut self,
        subscription_id: SubscriptionId,
        timestamps: TimestampsToReturn,
        request: MonitoredItemCreateRequest,
    ) -> OpcUaResult<MonitoredItemCreateResult> {
        let session = self.session()?;

        let item = opcua::types::MonitoredItemCreateRequest {
            item_to_monitor: opcua::types::ReadValueId {
                node_id: Self::to_opcua_node_id(request.node_id()),
                attribute_id: UaAttributeId::Value as u32,
                index_range: opcua::types::UAString::null(),
                data_encoding: opcua::types::QualifiedName::null(),
            },
            monitoring_mode: Self::to_opcua_monitoring_mode(request.monitoring_mode),
            requested_parameters: UaMonitoringParameters {
                client_handle: request.client_handle(),
                sampling_interval: request.requested_parameters.sampling_interval.as_millis()
                    as f64,
                filter: ExtensionObject::null(),
                queue_size: request.requested_parameters.queue_size,
                discard_oldest: request.requested_parameters.discard_oldest,
            },
        };
        let node = request.node_id().to_string();
        let ua_timestamps = Self::to_opcua_timestamps(timestamps);

        let results = blocking(move || {
            session
                .read()
                .create_monitored_items(subscription_id.value(), ua_timestamps, &[item])
                .map_err(|status| {
                    OpcUaError::subscription(SubscriptionError::monitored_item_failed(
                        node.as_str(),
                        StatusCode(status.bits()),
                    ))
                })
        })
        .await?;

        let result = results.into_iter().next().ok_or_else(|| {
            OpcUaError::subscription(SubscriptionError::monitored_item_failed(
                request.node_id().to_string(),
                StatusCode::BAD_UNEXPECTED_ERROR,
            ))
        })?;

        let status = StatusCode(result.status_code.bits());
        if !status.is_good() {
            return Err(OpcUaError::subscription(
                SubscriptionError::monitored_item_failed(request.node_id().to_string(), status),
            ));
        }

        Ok(MonitoredItemCreateResult {
            status_code: status,
            monitored_item_id: MonitoredItemId::new(result.monitored_item_id),
            revised_sampling_interval: Duration::from_secs_f64(
                result.revised_sampling_interval.max(0.0) / 1000.0,
            ),
            revised_queue_size: result.revised_queue_size,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_conversion() {
        let node = RealUaClient::to_opcua_node_id(&NodeId::SERVER_STATUS_CURRENT_TIME);
        assert_eq!(node, opcua::types::NodeId::new(0, 2258u32));
    }

    #[test]
    fn test_variant_conversion() {
        use opcua::types::Variant;

        assert_eq!(
            RealUaClient::from_opcua_variant(&Variant::Int32(-4)),
            OpcUaValue::Int32(-4)
        );
        assert_eq!(
            RealUaClient::from_opcua_variant(&Variant::Empty),
            OpcUaValue::Null
        );
        let now = opcua::types::DateTime::now();
        let value = RealUaClient::from_opcua_variant(&Variant::DateTime(Box::new(now)));
        assert!(value.as_datetime().is_some());
    }

    fn batch(handle: u32) -> Vec<MonitoredItemNotification> {
        vec![MonitoredItemNotification::new(
            handle,
            DataValue::new(OpcUaValue::UInt32(handle)),
        )]
    }

    #[test]
    fn test_early_publish_waits_for_subscription_id() {
        let events: EventQueue = Arc::new(Mutex::new(Vec::new()));
        let mut slot = SubscriptionSlot::Pending(Vec::new());

        slot.deliver(&events, batch(1));
        slot.deliver(&events, batch(2));
        assert!(events.lock().is_empty());

        slot.resolve(&events, SubscriptionId::new(7));
        slot.deliver(&events, batch(3));

        let delivered: Vec<(u32, u32)> = events
            .lock()
            .iter()
            .map(|event| match event {
                ClientEvent::DataChange(n) => (n.subscription_id.value(), n.items[0].client_handle),
                other => panic!("unexpected event {other}"),
            })
            .collect();
        assert_eq!(delivered, vec![(7, 1), (7, 2), (7, 3)]);
    }

    #[tokio::test]
    async fn test_discovery_channel_reports_no_state_change() {
        let mut client = RealUaClient::new(ClientSettings::default());
        client.connect_secure_channel("opc.tcp://localhost:4840").await.unwrap();

        assert_eq!(client.connected_endpoint(), Some("opc.tcp://localhost:4840"));
        assert!(!client.is_connected());
        assert!(client.run_iterate(Duration::from_millis(10)).await.unwrap().is_empty());

        let err = client
            .find_servers_on_network(&FindServersOnNetworkRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(StatusCode::BAD_SERVICE_UNSUPPORTED));
    }

    #[tokio::test]
    async fn test_new_client_is_closed() {
        let mut client = RealUaClient::new(ClientSettings::default());
        assert_eq!(client.channel_state(), SecureChannelState::Closed);
        assert!(client.connected_endpoint().is_none());
        assert!(client.create_subscription(CreateSubscriptionRequest::default()).await.is_err());

        let events = client.run_iterate(Duration::from_millis(10)).await.unwrap();
        assert!(events.is_empty());
    }
}
