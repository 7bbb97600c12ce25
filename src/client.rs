//! Registry client implementation
//!
//! Turns fire-and-forget pub/sub messaging into correlated, awaitable
//! remote calls: each operation opens a transient reply subscription,
//! publishes its request, and completes when the reply arrives, the
//! transport fails, or the optional deadline expires.

use crate::bus::{ConsumerHandle, DeliveryHandler, MessageBus};
use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::messages::{
    AckReply, DataRequest, DataSample, DeviceListReply, DeviceRequest, ListRequest, RegisterReply,
    RegisterRequest, SchemaReply, SensorDescriptor, UpdateSchemaRequest,
};
use crate::routes::{Operation, RouteTable};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Client for the device registry, speaking request/response over a
/// publish/subscribe bus
///
/// Each call owns an independent reply subscription and completion slot,
/// so any number of calls may be in flight concurrently on the shared bus.
pub struct RegistryClient {
    config: RegistryConfig,
    bus: Arc<dyn MessageBus>,
    routes: RouteTable,
}

impl RegistryClient {
    /// Create a client from a configuration, a bus, and a routing table
    pub fn new(config: RegistryConfig, bus: Arc<dyn MessageBus>, routes: RouteTable) -> Self {
        Self { config, bus, routes }
    }

    /// Register a device under the given id and name
    pub async fn register(&self, device_id: &str, name: &str) -> Result<RegisterReply> {
        let request = RegisterRequest {
            token: self.config.token.clone(),
            device_id: device_id.to_string(),
            name: name.to_string(),
        };
        self.call(Operation::Register, &request).await
    }

    /// Remove a device from the registry
    pub async fn unregister(&self, device_id: &str) -> Result<AckReply> {
        let request = DeviceRequest {
            token: self.config.token.clone(),
            device_id: device_id.to_string(),
        };
        self.call(Operation::Unregister, &request).await
    }

    /// Check that a device id is known and authorized
    pub async fn auth_device(&self, device_id: &str) -> Result<AckReply> {
        let request = DeviceRequest {
            token: self.config.token.clone(),
            device_id: device_id.to_string(),
        };
        self.call(Operation::AuthDevice, &request).await
    }

    /// List all registered devices
    pub async fn get_devices(&self) -> Result<DeviceListReply> {
        let request = ListRequest {
            token: self.config.token.clone(),
        };
        self.call(Operation::GetDevices, &request).await
    }

    /// Replace a device's sensor schema
    ///
    /// The schema is ordered; the broker echoes it back unchanged on
    /// success and the reply preserves sensor order.
    pub async fn update_schema(
        &self,
        device_id: &str,
        schema: Vec<SensorDescriptor>,
    ) -> Result<SchemaReply> {
        let request = UpdateSchemaRequest {
            token: self.config.token.clone(),
            device_id: device_id.to_string(),
            schema,
        };
        self.call(Operation::UpdateSchema, &request).await
    }

    /// Publish telemetry samples for a device
    ///
    /// Fire-and-forget: exactly one publish, no reply subscription is ever
    /// opened. Fails only if the publish itself cannot be performed.
    pub async fn publish_data(&self, device_id: &str, samples: Vec<DataSample>) -> Result<()> {
        let route = self.routes.resolve(Operation::PublishData);
        let request = DataRequest {
            token: self.config.token.clone(),
            device_id: device_id.to_string(),
            samples,
        };
        let payload = serde_json::to_value(&request)?;
        self.bus.publish(&route.request_channel, payload).await
    }

    /// Execute one correlated request/response exchange
    ///
    /// Subscribes to the reply channel before publishing, so a reply that
    /// arrives immediately after the request still finds its consumer.
    /// The reply consumer is released on every path out of this function;
    /// a failed release is logged and never surfaced to the caller.
    async fn call<Req, Rep>(&self, op: Operation, request: &Req) -> Result<Rep>
    where
        Req: Serialize,
        Rep: DeserializeOwned,
    {
        let route = self.routes.resolve(op);

        let (reply_tx, reply_rx) = oneshot::channel();
        let slot = Arc::new(Mutex::new(Some(reply_tx)));

        let handler: DeliveryHandler = Arc::new({
            let slot = slot.clone();
            move |payload| {
                // First delivery takes the sender; later deliveries are dropped.
                match slot.lock().take() {
                    Some(tx) => {
                        let _ = tx.send(classify_reply(payload));
                    }
                    None => debug!("dropping late reply delivery"),
                }
            }
        });

        let consumer = self.bus.subscribe(&route.reply_channel, handler).await?;

        let outcome = match serde_json::to_value(request) {
            Ok(payload) => match self.bus.publish(&route.request_channel, payload).await {
                Ok(()) => self.await_reply(reply_rx).await,
                Err(e) => Err(e),
            },
            Err(e) => Err(RegistryError::Serialization(e)),
        };

        self.release_consumer(&consumer).await;

        let payload = outcome?;
        serde_json::from_value(payload).map_err(RegistryError::Serialization)
    }

    /// Wait for the reply, bounded by the configured deadline if any
    async fn await_reply(
        &self,
        reply_rx: oneshot::Receiver<Result<serde_json::Value>>,
    ) -> Result<serde_json::Value> {
        let delivered = match self.config.call_timeout {
            Some(limit) => match timeout(limit, reply_rx).await {
                Ok(delivered) => delivered,
                Err(_) => return Err(RegistryError::Timeout),
            },
            None => reply_rx.await,
        };

        // The sender lives in the delivery handler held by the bus for the
        // duration of the call, so this only fails if the bus dropped it.
        delivered.unwrap_or_else(|_| {
            Err(RegistryError::Transport("reply consumer dropped".to_string()))
        })
    }

    /// Best-effort release of a reply consumer; failures never surface
    async fn release_consumer(&self, consumer: &ConsumerHandle) {
        if let Err(e) = self.bus.unsubscribe(consumer).await {
            warn!(
                channel = consumer.channel(),
                "failed to release reply consumer: {}", e
            );
        }
    }
}

/// Classify a delivered reply payload
///
/// A non-empty `error` field converts a structurally successful delivery
/// into a call failure carrying that message verbatim. An absent or empty
/// `error` field means success even if sibling fields are null.
fn classify_reply(payload: serde_json::Value) -> Result<serde_json::Value> {
    match payload.get("error").and_then(serde_json::Value::as_str) {
        Some(message) if !message.is_empty() => Err(RegistryError::Remote(message.to_string())),
        _ => Ok(payload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_reply_success() {
        let payload = serde_json::json!({"id": "abc123"});
        let result = classify_reply(payload.clone());
        assert_eq!(result.unwrap(), payload);
    }

    #[test]
    fn test_classify_reply_error_field() {
        let payload = serde_json::json!({"id": "abc123", "error": "error registering thing"});
        let result = classify_reply(payload);
        assert!(
            matches!(result, Err(RegistryError::Remote(msg)) if msg == "error registering thing")
        );
    }

    #[test]
    fn test_classify_reply_empty_error_is_success() {
        let payload = serde_json::json!({"id": "abc123", "error": ""});
        assert!(classify_reply(payload).is_ok());
    }

    #[test]
    fn test_classify_reply_null_error_is_success() {
        let payload = serde_json::json!({"id": "abc123", "error": null});
        assert!(classify_reply(payload).is_ok());
    }

    #[test]
    fn test_classify_reply_null_siblings_are_success() {
        // updateSchema replies may carry schema: null without an error.
        let payload = serde_json::json!({"id": "abc123", "schema": null});
        assert!(classify_reply(payload).is_ok());
    }
}
