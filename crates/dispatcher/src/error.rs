//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Broker creation error
    #[error("failed to create broker '{name}': {message}")]
    BrokerCreation { name: String, message: String },

    /// Event could not be serialized
    #[error("failed to encode event '{event_id}': {message}")]
    Encode { event_id: String, message: String },

    /// Encoded event exceeds the message size limit
    #[error("event '{event_id}' encodes to {size} bytes, limit is {max}")]
    MessageTooLarge {
        event_id: String,
        size: usize,
        max: usize,
    },

    /// Group publish exceeded its deadline
    #[error("publish to topic '{topic}' timed out after {timeout_ms}ms")]
    PublishTimeout { topic: String, timeout_ms: u64 },

    /// Group publish task panicked or was cancelled
    #[error("publish task for topic '{topic}' aborted: {message}")]
    PublishAborted { topic: String, message: String },

    /// Broker error (from contract)
    #[error("broker error: {0}")]
    Contract(#[from] contracts::ContractError),
}

impl DispatcherError {
    /// Create a broker creation error
    pub fn broker_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BrokerCreation {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an encode error
    pub fn encode(event_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Encode {
            event_id: event_id.into(),
            message: message.into(),
        }
    }

    /// Whether the error is scoped to a single event rather than a topic group
    pub fn is_event_scoped(&self) -> bool {
        matches!(self, Self::Encode { .. } | Self::MessageTooLarge { .. })
    }
}
