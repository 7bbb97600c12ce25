//! Error types for the registry client

use thiserror::Error;

/// Errors that can occur when executing a registry operation
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A message bus primitive (publish, subscribe, unsubscribe) failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// The reply was delivered but carried a non-empty `error` field
    #[error("Remote error: {0}")]
    Remote(String),

    /// No reply arrived within the configured deadline
    #[error("Operation timed out")]
    Timeout,

    /// Failed to serialize/deserialize a message envelope
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
