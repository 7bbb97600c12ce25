//! Message bus abstraction consumed by the registry client
//!
//! The client never manages a broker connection itself; it drives a
//! [`MessageBus`] implementation through four narrow primitives. The
//! [`InMemoryBus`] loopback implementation is provided for tests and
//! local development.

use crate::error::{RegistryError, Result};

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Callback invoked with each payload delivered on a subscribed channel
pub type DeliveryHandler = Arc<dyn Fn(serde_json::Value) + Send + Sync>;

/// Identifies one active consumer on a channel
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConsumerHandle {
    id: Uuid,
    channel: String,
}

impl ConsumerHandle {
    /// Create a handle for a consumer on the given channel
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: channel.into(),
        }
    }

    /// The consumer's unique id
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The channel this consumer is attached to
    pub fn channel(&self) -> &str {
        &self.channel
    }
}

/// Publish/subscribe transport the client runs on
///
/// Implementations are expected to be internally concurrency-safe: the
/// client shares one bus across all in-flight calls.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Start the underlying connection
    async fn start(&self) -> Result<()>;

    /// Stop the underlying connection
    async fn stop(&self) -> Result<()>;

    /// Publish a payload to a named channel
    async fn publish(&self, channel: &str, payload: serde_json::Value) -> Result<()>;

    /// Attach a consumer to a named channel
    ///
    /// The handler is called once per delivered payload. The consumer must
    /// be fully established when this returns: a payload published to the
    /// channel afterwards is guaranteed to reach the handler.
    async fn subscribe(&self, channel: &str, on_delivery: DeliveryHandler)
        -> Result<ConsumerHandle>;

    /// Detach a previously subscribed consumer
    async fn unsubscribe(&self, handle: &ConsumerHandle) -> Result<()>;
}

/// Loopback bus that dispatches published payloads to consumers in-process
#[derive(Default)]
pub struct InMemoryBus {
    consumers: Mutex<HashMap<String, Vec<(Uuid, DeliveryHandler)>>>,
    stopped: AtomicBool,
}

impl InMemoryBus {
    /// Create a new loopback bus
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_running(&self) -> Result<()> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(RegistryError::Transport("bus is stopped".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn start(&self) -> Result<()> {
        self.stopped.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.stopped.store(true, Ordering::SeqCst);
        self.consumers.lock().clear();
        Ok(())
    }

    async fn publish(&self, channel: &str, payload: serde_json::Value) -> Result<()> {
        self.ensure_running()?;

        // Clone handlers out of the lock so a handler can re-enter the bus.
        let handlers: Vec<DeliveryHandler> = {
            let consumers = self.consumers.lock();
            consumers
                .get(channel)
                .map(|entries| entries.iter().map(|(_, h)| h.clone()).collect())
                .unwrap_or_default()
        };

        debug!(channel, deliveries = handlers.len(), "publishing payload");
        for handler in handlers {
            handler(payload.clone());
        }
        Ok(())
    }

    async fn subscribe(
        &self,
        channel: &str,
        on_delivery: DeliveryHandler,
    ) -> Result<ConsumerHandle> {
        self.ensure_running()?;

        let handle = ConsumerHandle::new(channel);
        self.consumers
            .lock()
            .entry(channel.to_string())
            .or_default()
            .push((handle.id(), on_delivery));

        debug!(channel, consumer = %handle.id(), "consumer attached");
        Ok(handle)
    }

    async fn unsubscribe(&self, handle: &ConsumerHandle) -> Result<()> {
        let mut consumers = self.consumers.lock();
        if let Some(entries) = consumers.get_mut(handle.channel()) {
            entries.retain(|(id, _)| *id != handle.id());
            if entries.is_empty() {
                consumers.remove(handle.channel());
            }
        }

        debug!(channel = handle.channel(), consumer = %handle.id(), "consumer detached");
        Ok(())
    }
}
