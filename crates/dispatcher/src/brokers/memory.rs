//! InMemoryBroker - records batches in process memory

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use contracts::{BrokerMessage, ContractError, MessageBroker, TopicId};
use tracing::{debug, instrument};

/// One batch accepted by the in-memory broker
#[derive(Debug, Clone)]
pub struct PublishedBatch {
    pub topic: TopicId,
    pub messages: Vec<BrokerMessage>,
}

#[derive(Debug, Default)]
struct MemoryState {
    batches: Vec<PublishedBatch>,
    rejected_topics: HashMap<TopicId, String>,
    latency: Option<Duration>,
    unavailable: bool,
    closed: bool,
}

/// Broker that keeps every accepted batch in memory
///
/// Supports fault injection (rejected topics, added latency, full outage) so
/// dispatch behaviour can be exercised without a real broker.
#[derive(Debug)]
pub struct InMemoryBroker {
    name: String,
    state: Mutex<MemoryState>,
}

impl InMemoryBroker {
    /// Create a new InMemoryBroker with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(MemoryState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reject every future batch for `topic`
    pub fn reject_topic(&self, topic: impl Into<TopicId>, reason: impl Into<String>) {
        self.state()
            .rejected_topics
            .insert(topic.into(), reason.into());
    }

    /// Delay every batch by `latency` before accepting or rejecting it
    pub fn set_latency(&self, latency: Duration) {
        self.state().latency = Some(latency);
    }

    /// Simulate the broker being unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state().unavailable = unavailable;
    }

    /// All accepted batches, in acceptance order
    pub fn batches(&self) -> Vec<PublishedBatch> {
        self.state().batches.clone()
    }

    /// Number of accepted batches for `topic`
    pub fn publish_count(&self, topic: &str) -> usize {
        self.state()
            .batches
            .iter()
            .filter(|b| b.topic == topic)
            .count()
    }

    /// Total accepted messages across all topics
    pub fn message_count(&self) -> usize {
        self.state().batches.iter().map(|b| b.messages.len()).sum()
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }
}

impl MessageBroker for InMemoryBroker {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "memory_broker_send_batch",
        skip(self, messages),
        fields(broker = %self.name, topic = %topic, messages = messages.len())
    )]
    async fn send_batch(
        &self,
        topic: &TopicId,
        messages: Vec<BrokerMessage>,
    ) -> Result<(), ContractError> {
        let latency = self.state().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state();
        if state.closed {
            return Err(ContractError::broker_connection(&self.name, "broker closed"));
        }
        if state.unavailable {
            return Err(ContractError::broker_unavailable(
                &self.name,
                "simulated outage",
            ));
        }
        if let Some(reason) = state.rejected_topics.get(topic.as_str()) {
            return Err(ContractError::broker_rejected(
                &self.name,
                topic.as_str(),
                reason.clone(),
            ));
        }

        state.batches.push(PublishedBatch {
            topic: topic.clone(),
            messages,
        });
        Ok(())
    }

    #[instrument(name = "memory_broker_close", skip(self))]
    async fn close(&self) -> Result<(), ContractError> {
        self.state().closed = true;
        debug!(broker = %self.name, "InMemoryBroker closed");
        Ok(())
    }
}
