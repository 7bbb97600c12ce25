//! Configuration for the registry client

use std::time::Duration;

/// Configuration for a [`RegistryClient`](crate::RegistryClient)
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Authorization token carried in every request envelope
    pub token: String,

    /// Deadline for a single request/response exchange.
    ///
    /// `None` means wait indefinitely for the reply.
    pub call_timeout: Option<Duration>,
}

impl RegistryConfig {
    /// Create a new configuration with the given authorization token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            call_timeout: None,
        }
    }

    /// Bound each request/response exchange by a deadline
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }
}
