//! LogBroker - logs batch summaries via tracing

use contracts::{BrokerMessage, ContractError, MessageBroker, TopicId};
use tracing::{debug, info, instrument};

/// Broker that only logs what it would publish, for debugging
pub struct LogBroker {
    name: String,
}

impl LogBroker {
    /// Create a new LogBroker with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_batch_summary(&self, topic: &TopicId, messages: &[BrokerMessage]) {
        let bytes: usize = messages.iter().map(|m| m.value.len()).sum();

        info!(
            broker = %self.name,
            topic = %topic,
            messages = messages.len(),
            bytes,
            first_key = messages.first().map(|m| m.key.as_str()),
            last_key = messages.last().map(|m| m.key.as_str()),
            "Batch published"
        );

        for message in messages {
            debug!(
                broker = %self.name,
                topic = %topic,
                key = %message.key,
                timestamp = %message.timestamp,
                "Message"
            );
        }
    }
}

impl MessageBroker for LogBroker {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_broker_send_batch",
        skip(self, messages),
        fields(broker = %self.name, topic = %topic)
    )]
    async fn send_batch(
        &self,
        topic: &TopicId,
        messages: Vec<BrokerMessage>,
    ) -> Result<(), ContractError> {
        self.log_batch_summary(topic, &messages);
        Ok(())
    }

    #[instrument(name = "log_broker_close", skip(self))]
    async fn close(&self) -> Result<(), ContractError> {
        info!(broker = %self.name, "LogBroker closed");
        Ok(())
    }
}
