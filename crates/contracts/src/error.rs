//! Layered error definitions
//!
//! Categorized by source: config / encode / broker

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Encode Errors =====
    /// Event could not be turned into a broker message
    #[error("encode error for event '{event_id}': {message}")]
    Encode { event_id: String, message: String },

    // ===== Broker Errors =====
    /// No broker endpoint could be reached
    #[error("broker '{broker}' unavailable: {message}")]
    BrokerUnavailable { broker: String, message: String },

    /// Broker refused a batch
    #[error("broker '{broker}' rejected batch for topic '{topic}': {message}")]
    BrokerRejected {
        broker: String,
        topic: String,
        message: String,
    },

    /// Broker connection broke mid-publish
    #[error("broker '{broker}' connection error: {message}")]
    BrokerConnection { broker: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create encode error
    pub fn encode(event_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Encode {
            event_id: event_id.into(),
            message: message.into(),
        }
    }

    /// Create broker unavailable error
    pub fn broker_unavailable(broker: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BrokerUnavailable {
            broker: broker.into(),
            message: message.into(),
        }
    }

    /// Create broker rejected error
    pub fn broker_rejected(
        broker: impl Into<String>,
        topic: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::BrokerRejected {
            broker: broker.into(),
            topic: topic.into(),
            message: message.into(),
        }
    }

    /// Create broker connection error
    pub fn broker_connection(broker: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BrokerConnection {
            broker: broker.into(),
            message: message.into(),
        }
    }
}
