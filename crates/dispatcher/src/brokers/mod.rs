//! Broker implementations
//!
//! Contains InMemoryBroker, LogBroker, and NetworkBroker.

mod log;
mod memory;
pub mod network;

pub use self::log::LogBroker;
pub use self::memory::{InMemoryBroker, PublishedBatch};
pub use self::network::{NetworkBroker, NetworkBrokerConfig};

use contracts::{BrokerMessage, ContractError, MessageBroker, TopicId};

/// Broker selected at runtime from configuration
pub enum AnyBroker {
    Memory(InMemoryBroker),
    Log(LogBroker),
    Network(NetworkBroker),
}

impl MessageBroker for AnyBroker {
    fn name(&self) -> &str {
        match self {
            Self::Memory(broker) => broker.name(),
            Self::Log(broker) => broker.name(),
            Self::Network(broker) => broker.name(),
        }
    }

    async fn send_batch(
        &self,
        topic: &TopicId,
        messages: Vec<BrokerMessage>,
    ) -> Result<(), ContractError> {
        match self {
            Self::Memory(broker) => broker.send_batch(topic, messages).await,
            Self::Log(broker) => broker.send_batch(topic, messages).await,
            Self::Network(broker) => broker.send_batch(topic, messages).await,
        }
    }

    async fn close(&self) -> Result<(), ContractError> {
        match self {
            Self::Memory(broker) => broker.close().await,
            Self::Log(broker) => broker.close().await,
            Self::Network(broker) => broker.close().await,
        }
    }
}
