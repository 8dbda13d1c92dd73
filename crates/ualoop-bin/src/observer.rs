// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Client event handling.
//!
//! [`CurrentTimeWatcher`] reacts to the events of one client:
//!
//! - channel and session transitions are logged;
//! - each new session activation creates a subscription and, if that
//!   succeeds, a monitored item on the server current-time node;
//! - data changes go to the [`NotificationDispatcher`];
//! - subscription deletion and inactivity are logged.
//!
//! Failures are logged and never leave the handler. A failed subscription
//! is not retried until the session is activated again.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use ualoop_opcua::{
    ClientEvent, ClientSettings, CreateSubscriptionRequest, EventHandler, MonitoredItemCreateRequest,
    MonitoredItemId, MonitoredItemSettings, NodeId, SecureChannelState, SessionState,
    SubscriptionId, TimestampsToReturn, UaClient,
};

use crate::dispatch::{
    current_time_handler, CurrentTimeLog, NotificationDispatcher, CURRENT_TIME_CLIENT_HANDLE,
};
use crate::error::BinResult;

// =============================================================================
// CurrentTimeWatcher
// =============================================================================

/// Subscribes to the server current time on every session activation.
#[derive(Debug)]
pub struct CurrentTimeWatcher {
    subscription: CreateSubscriptionRequest,
    monitored_item: MonitoredItemSettings,
    dispatcher: NotificationDispatcher,
    current_time: Arc<CurrentTimeLog>,

    channel: SecureChannelState,
    session: SessionState,
    active_subscription: Option<SubscriptionId>,
    current_time_item: Option<MonitoredItemId>,
}

impl CurrentTimeWatcher {
    /// Creates a watcher with the request parameters of `settings`.
    pub fn new(settings: &ClientSettings) -> BinResult<Self> {
        Self::with_dispatcher(settings, NotificationDispatcher::new())
    }

    /// Creates a watcher on top of a dispatcher that may already hold
    /// other handles.
    ///
    /// # Errors
    ///
    /// Fails if the current-time client handle is already registered.
    pub fn with_dispatcher(
        settings: &ClientSettings,
        mut dispatcher: NotificationDispatcher,
    ) -> BinResult<Self> {
        let current_time = Arc::new(CurrentTimeLog::new());
        dispatcher.register(
            CURRENT_TIME_CLIENT_HANDLE,
            current_time_handler(current_time.clone()),
        )?;

        Ok(Self {
            subscription: CreateSubscriptionRequest::from_settings(&settings.subscription),
            monitored_item: settings.monitored_item.clone(),
            dispatcher,
            current_time,
            channel: SecureChannelState::default(),
            session: SessionState::default(),
            active_subscription: None,
            current_time_item: None,
        })
    }

    /// Returns the decoded current-time values.
    pub fn current_time(&self) -> Arc<CurrentTimeLog> {
        self.current_time.clone()
    }

    /// Returns the dispatcher, to register more handles.
    pub fn dispatcher_mut(&mut self) -> &mut NotificationDispatcher {
        &mut self.dispatcher
    }

    /// Last observed channel state.
    pub fn channel_state(&self) -> SecureChannelState {
        self.channel
    }

    /// Last observed session state.
    pub fn session_state(&self) -> SessionState {
        self.session
    }

    /// The subscription created for the current session, if any.
    pub fn active_subscription(&self) -> Option<SubscriptionId> {
        self.active_subscription
    }

    /// The current-time monitored item, if it was created.
    pub fn current_time_item(&self) -> Option<MonitoredItemId> {
        self.current_time_item
    }

    async fn on_state_changed(
        &mut self,
        client: &mut dyn UaClient,
        channel: SecureChannelState,
        session: SessionState,
    ) {
        if channel != self.channel {
            match channel_message(channel) {
                Some(message) => info!("{}", message),
                None => debug!(channel = %channel, "Secure channel state changed"),
            }
            self.channel = channel;
        }

        if session == self.session {
            return;
        }
        self.session = session;

        match session {
            SessionState::Activated => {
                info!("A session with the server is activated");
                self.subscribe_current_time(client).await;
            }
            SessionState::Closed => {
                info!("Session disconnected");
                self.clear_subscription();
            }
            other => debug!(session = %other, "Session state changed"),
        }
    }

    async fn subscribe_current_time(&mut self, client: &mut dyn UaClient) {
        let response = match client.create_subscription(self.subscription.clone()).await {
            Ok(response) => response,
            Err(e) => {
                e.log("create subscription");
                return;
            }
        };

        let subscription_id = response.subscription_id;
        info!(
            subscription_id = subscription_id.value(),
            publishing_interval = ?response.revised_publishing_interval,
            "Create subscription succeeded, id {}",
            subscription_id
        );
        self.active_subscription = Some(subscription_id);

        let request = MonitoredItemCreateRequest::from_settings(
            NodeId::SERVER_STATUS_CURRENT_TIME,
            &self.monitored_item,
        )
        .with_client_handle(CURRENT_TIME_CLIENT_HANDLE);

        match client
            .create_monitored_item(subscription_id, TimestampsToReturn::Both, request)
            .await
        {
            Ok(result) => {
                info!(
                    subscription_id = subscription_id.value(),
                    monitored_item_id = result.monitored_item_id.value(),
                    "Monitoring Server_ServerStatus_CurrentTime, id {}",
                    result.monitored_item_id
                );
                self.current_time_item = Some(result.monitored_item_id);
            }
            Err(e) => e.log("monitor Server_ServerStatus_CurrentTime"),
        }
    }

    fn clear_subscription(&mut self) {
        self.active_subscription = None;
        self.current_time_item = None;
    }
}

#[async_trait]
impl EventHandler for CurrentTimeWatcher {
    async fn handle(&mut self, client: &mut dyn UaClient, event: ClientEvent) {
        match event {
            ClientEvent::StateChanged { channel, session } => {
                self.on_state_changed(client, channel, session).await;
            }
            ClientEvent::DataChange(batch) => {
                self.dispatcher.dispatch(&batch);
            }
            ClientEvent::SubscriptionDeleted { subscription_id } => {
                info!(
                    subscription_id = subscription_id.value(),
                    "Subscription Id {} was deleted",
                    subscription_id
                );
                if self.active_subscription == Some(subscription_id) {
                    self.clear_subscription();
                }
            }
            ClientEvent::SubscriptionInactive { subscription_id } => {
                info!(
                    subscription_id = subscription_id.value(),
                    "Inactivity for subscription {}",
                    subscription_id
                );
            }
        }
    }
}

/// Log line for a channel state, for the states worth reporting.
fn channel_message(state: SecureChannelState) -> Option<&'static str> {
    match state {
        SecureChannelState::Closed => Some("The client is disconnected"),
        SecureChannelState::HelSent => Some("Waiting for ack"),
        SecureChannelState::OpnSent => Some("Waiting for OPN Response"),
        SecureChannelState::Open => Some("A SecureChannel to the server is open"),
        _ => None,
    }
}

// =============================================================================
// Tests
// =============================================================================
