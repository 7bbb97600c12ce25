//! Routing table mapping logical operations to channel names

use std::collections::HashMap;

/// Logical registry operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Register a device
    Register,
    /// Unregister a device
    Unregister,
    /// Authenticate a device
    AuthDevice,
    /// List known devices
    GetDevices,
    /// Replace a device's sensor schema
    UpdateSchema,
    /// Publish telemetry samples (fire-and-forget)
    PublishData,
}

impl Operation {
    /// All operations, in a fixed order
    pub const ALL: [Operation; 6] = [
        Operation::Register,
        Operation::Unregister,
        Operation::AuthDevice,
        Operation::GetDevices,
        Operation::UpdateSchema,
        Operation::PublishData,
    ];
}

/// Channel pair for one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Channel requests are published to
    pub request_channel: String,
    /// Channel replies are delivered on.
    ///
    /// Present for every operation; [`Operation::PublishData`] never
    /// subscribes to it.
    pub reply_channel: String,
}

impl Route {
    fn new(request: &str) -> Self {
        Self {
            request_channel: request.to_string(),
            reply_channel: format!("{request}.reply"),
        }
    }
}

/// Pure lookup table from operation to channel names
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: HashMap<Operation, Route>,
}

impl RouteTable {
    /// Resolve the channel pair for an operation
    pub fn resolve(&self, op: Operation) -> &Route {
        // The table is total over Operation; Default and with_route keep it so.
        &self.routes[&op]
    }

    /// Override the route for one operation
    pub fn with_route(mut self, op: Operation, request: &str, reply: &str) -> Self {
        self.routes.insert(
            op,
            Route {
                request_channel: request.to_string(),
                reply_channel: reply.to_string(),
            },
        );
        self
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        let mut routes = HashMap::new();
        routes.insert(Operation::Register, Route::new("registry.device.register"));
        routes.insert(Operation::Unregister, Route::new("registry.device.unregister"));
        routes.insert(Operation::AuthDevice, Route::new("registry.device.auth"));
        routes.insert(Operation::GetDevices, Route::new("registry.device.list"));
        routes.insert(Operation::UpdateSchema, Route::new("registry.device.schema"));
        routes.insert(Operation::PublishData, Route::new("registry.device.data"));
        Self { routes }
    }
}
