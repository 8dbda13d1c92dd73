// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Notification dispatch by client handle.
//!
//! The server echoes the client handle of a monitored item in each of its
//! notifications. [`NotificationDispatcher`] maps those handles to
//! handler closures and routes one publish batch at a time.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use ualoop_opcua::{ClientHandle, DataChangeNotification, DataValue, DateTimeParts, OpcUaValue};

use crate::error::{BinError, BinResult};

/// Client handle of the server current-time monitored item.
pub const CURRENT_TIME_CLIENT_HANDLE: ClientHandle = 42;

/// A handler for the values of one monitored item.
pub type NotificationHandler = Box<dyn FnMut(&DataValue) + Send>;

// =============================================================================
// NotificationDispatcher
// =============================================================================

/// Routes data change notifications to per-handle handlers.
#[derive(Default)]
pub struct NotificationDispatcher {
    handlers: HashMap<ClientHandle, NotificationHandler>,
}

impl NotificationDispatcher {
    /// Creates an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `client_handle`.
    ///
    /// # Errors
    ///
    /// Fails if the handle already has a handler.
    pub fn register<F>(&mut self, client_handle: ClientHandle, handler: F) -> BinResult<()>
    where
        F: FnMut(&DataValue) + Send + 'static,
    {
        if self.handlers.contains_key(&client_handle) {
            return Err(BinError::config(format!(
                "client handle {} is already registered",
                client_handle
            )));
        }
        self.handlers.insert(client_handle, Box::new(handler));
        Ok(())
    }

    /// Returns true if `client_handle` has a handler.
    pub fn is_registered(&self, client_handle: ClientHandle) -> bool {
        self.handlers.contains_key(&client_handle)
    }

    /// Number of registered handles.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if no handle is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Delivers every entry of `batch` to the handler of its client handle.
    ///
    /// Entries with unknown handles are skipped. Returns the number of
    /// entries delivered.
    pub fn dispatch(&mut self, batch: &DataChangeNotification) -> usize {
        let mut delivered = 0;
        for item in &batch.items {
            match self.handlers.get_mut(&item.client_handle) {
                Some(handler) => {
                    handler(&item.value);
                    delivered += 1;
                }
                None => debug!(
                    subscription_id = %batch.subscription_id,
                    client_handle = item.client_handle,
                    "Ignoring notification for unknown client handle"
                ),
            }
        }
        delivered
    }
}

impl fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut handles: Vec<_> = self.handlers.keys().copied().collect();
        handles.sort_unstable();
        f.debug_struct("NotificationDispatcher")
            .field("handles", &handles)
            .finish()
    }
}

// =============================================================================
// Current Time
// =============================================================================

/// What the current-time handler has decoded so far.
#[derive(Debug, Default)]
pub struct CurrentTimeLog {
    decoded: AtomicU64,
    last: Mutex<Option<DateTimeParts>>,
}

impl CurrentTimeLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of values decoded.
    pub fn decoded_count(&self) -> u64 {
        self.decoded.load(Ordering::Relaxed)
    }

    /// The last decoded value.
    pub fn last(&self) -> Option<DateTimeParts> {
        *self.last.lock()
    }

    fn record(&self, parts: DateTimeParts) {
        self.decoded.fetch_add(1, Ordering::Relaxed);
        *self.last.lock() = Some(parts);
    }
}

/// Returns the handler for the server current-time item.
///
/// Scalar DateTime values are logged as `DD-MM-YYYY hh:mm:ss.mmm` and
/// recorded in `log`. Anything else is skipped.
pub fn current_time_handler(log: Arc<CurrentTimeLog>) -> impl FnMut(&DataValue) + Send {
    move |value: &DataValue| match &value.value {
        OpcUaValue::DateTime(timestamp) => {
            let parts = DateTimeParts::from_datetime(timestamp);
            info!("currentTime has changed!");
            info!("date is: {}", parts);
            log.record(parts);
        }
        other => debug!(data_type = other.data_type().name(), "currentTime is not a DateTime"),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ualoop_opcua::{MonitoredItemNotification, SubscriptionId};

    fn batch(items: Vec<MonitoredItemNotification>) -> DataChangeNotification {
        DataChangeNotification::new(SubscriptionId::new(1), items)
    }

    fn item(handle: ClientHandle, value: OpcUaValue) -> MonitoredItemNotification {
        MonitoredItemNotification::new(handle, DataValue::new(value))
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut dispatcher = NotificationDispatcher::new();
        dispatcher.register(1, |_| {}).unwrap();

        assert!(dispatcher.register(1, |_| {}).is_err());
        assert!(dispatcher.is_registered(1));
        assert_eq!(dispatcher.len(), 1);
    }

    #[test]
    fn test_dispatch_routes_by_handle() {
        let mut dispatcher = NotificationDispatcher::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for handle in [1, 2] {
            let seen = seen.clone();
            dispatcher
                .register(handle, move |v: &DataValue| seen.lock().push((handle, v.value.clone())))
                .unwrap();
        }

        let delivered = dispatcher.dispatch(&batch(vec![
            item(2, OpcUaValue::Int32(20)),
            item(9, OpcUaValue::Int32(90)),
            item(1, OpcUaValue::Int32(10)),
        ]));

        assert_eq!(delivered, 2);
        assert_eq!(
            *seen.lock(),
            vec![(2, OpcUaValue::Int32(20)), (1, OpcUaValue::Int32(10))]
        );
    }

    #[test]
    fn test_current_time_decodes_datetime() {
        let log = Arc::new(CurrentTimeLog::new());
        let mut handler = current_time_handler(log.clone());

        let ts = Utc.with_ymd_and_hms(2024, 2, 29, 13, 4, 5).unwrap()
            + chrono::Duration::milliseconds(7);
        handler(&DataValue::new(OpcUaValue::DateTime(ts)));

        assert_eq!(log.decoded_count(), 1);
        assert_eq!(
            log.last().map(|p| p.to_string()).as_deref(),
            Some("29-02-2024 13:04:05.007")
        );
    }

    #[test]
    fn test_current_time_skips_other_types() {
        let log = Arc::new(CurrentTimeLog::new());
        let mut handler = current_time_handler(log.clone());

        handler(&DataValue::new(OpcUaValue::Int64(1)));
        handler(&DataValue::new(OpcUaValue::Null));
        handler(&DataValue::new(OpcUaValue::Array(vec![OpcUaValue::DateTime(Utc::now())])));

        assert_eq!(log.decoded_count(), 0);
        assert!(log.last().is_none());
    }
}
