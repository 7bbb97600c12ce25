//! Registry Client
//!
//! A device registry client that exposes synchronous-looking remote
//! operations (register, unregister, authenticate, list, schema update,
//! telemetry publish) over an asynchronous publish/subscribe message bus.
//!
//! The bus moves discrete payloads through named channels and has no native
//! request/response semantics; this crate supplies the correlation layer:
//! each call subscribes to its reply channel before publishing, completes
//! on the first matching delivery, and releases its consumer on every
//! outcome.
//!
//! # Example
//!
//! ```no_run
//! use registry_client::{InMemoryBus, RegistryClient, RegistryConfig, RouteTable};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = Arc::new(InMemoryBus::new());
//!     let config = RegistryConfig::new("your-token").call_timeout(Duration::from_secs(10));
//!     let client = RegistryClient::new(config, bus, RouteTable::default());
//!
//!     let reply = client.register("abc123", "my-device").await?;
//!     println!("registered as {}", reply.id);
//!
//!     let listing = client.get_devices().await?;
//!     for device in listing.devices {
//!         println!("{}: {}", device.id, device.name);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod bus;
mod client;
mod config;
mod error;
mod messages;
mod routes;

pub use bus::{ConsumerHandle, DeliveryHandler, InMemoryBus, MessageBus};
pub use client::RegistryClient;
pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use messages::{
    AckReply, DataRequest, DataSample, Device, DeviceListReply, DeviceRequest, ListRequest,
    RegisterReply, RegisterRequest, SchemaReply, SensorDescriptor, UpdateSchemaRequest,
};
pub use routes::{Operation, Route, RouteTable};
