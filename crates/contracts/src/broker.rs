//! MessageBroker trait - Publisher output interface
//!
//! Defines the abstract interface for broker transports.

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::{ContractError, TopicId};

/// One encoded event ready for the broker
#[derive(Debug, Clone)]
pub struct BrokerMessage {
    /// Routing / dedup key (the event id)
    pub key: String,
    /// Encoded event
    pub value: Bytes,
    /// Publish wall-clock time
    pub timestamp: DateTime<Utc>,
}

impl BrokerMessage {
    pub fn new(key: impl Into<String>, value: Bytes) -> Self {
        Self {
            key: key.into(),
            value,
            timestamp: Utc::now(),
        }
    }
}

/// Broker transport trait
///
/// All broker implementations must implement this trait. Methods take `&self`
/// because one broker handle serves every concurrent group publish.
#[trait_variant::make(MessageBroker: Send)]
pub trait LocalMessageBroker {
    /// Broker name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Send one batch of messages to `topic` as a single publish operation
    ///
    /// # Errors
    /// Returns a connection, rejection or IO error covering the whole batch
    async fn send_batch(
        &self,
        topic: &TopicId,
        messages: Vec<BrokerMessage>,
    ) -> Result<(), ContractError>;

    /// Release broker resources
    async fn close(&self) -> Result<(), ContractError>;
}
