//! TopicPublisher - one publish operation per topic group

use std::sync::Arc;
use std::time::{Duration, Instant};

use contracts::{BrokerMessage, MessageBroker, TopicId};
use tracing::{debug, instrument, warn};

use crate::encoder::MessageEncoder;
use crate::error::DispatcherError;
use crate::grouper::DispatchGroup;

/// Result of publishing one group
#[derive(Debug)]
pub struct GroupReport {
    /// Topic the group was published to
    pub topic: TopicId,
    /// Events that failed to encode, by batch position
    pub encode_failures: Vec<(usize, DispatcherError)>,
    /// Failure covering every successfully encoded event of the group
    pub publish_error: Option<DispatcherError>,
    /// Number of messages handed to the broker
    pub attempted: usize,
    /// Wall time spent on the group
    pub elapsed: Duration,
}

impl GroupReport {
    /// Report for a group whose publish task never produced a result
    pub fn aborted(topic: TopicId, message: impl Into<String>) -> Self {
        let publish_error = DispatcherError::PublishAborted {
            topic: topic.to_string(),
            message: message.into(),
        };
        Self {
            topic,
            encode_failures: Vec::new(),
            publish_error: Some(publish_error),
            attempted: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Whether the group counts as one publish in the metrics
    ///
    /// A group with nothing encodable never reaches the broker and is not counted.
    pub fn counts_as_publish(&self) -> bool {
        self.attempted > 0 || self.publish_error.is_some()
    }

    pub fn is_success(&self) -> bool {
        self.publish_error.is_none() && self.encode_failures.is_empty()
    }
}

/// Publishes groups to a shared broker, one attempt per group
pub struct TopicPublisher<B> {
    broker: Arc<B>,
    encoder: MessageEncoder,
    timeout: Duration,
}

impl<B: MessageBroker + Sync> TopicPublisher<B> {
    pub fn new(broker: Arc<B>, encoder: MessageEncoder, timeout: Duration) -> Self {
        Self {
            broker,
            encoder,
            timeout,
        }
    }

    pub fn broker(&self) -> &Arc<B> {
        &self.broker
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Encode every event of the group and send the encodable ones as one batch
    ///
    /// Never retries. If nothing in the group encodes, the broker is not called.
    #[instrument(
        name = "topic_publisher_publish",
        skip(self, group),
        fields(topic = %group.topic, events = group.len())
    )]
    pub async fn publish(&self, group: &DispatchGroup) -> GroupReport {
        let started = Instant::now();
        let (messages, encode_failures) = self.encode_group(group);
        let attempted = messages.len();

        let publish_error = if messages.is_empty() {
            debug!(topic = %group.topic, "Nothing encodable in group, skipping broker call");
            None
        } else {
            self.send(&group.topic, messages).await.err()
        };

        let elapsed = started.elapsed();

        match &publish_error {
            Some(e) => warn!(
                topic = %group.topic,
                broker = %self.broker.name(),
                messages = attempted,
                error = %e,
                "Group publish failed"
            ),
            None => debug!(
                topic = %group.topic,
                messages = attempted,
                elapsed_ms = elapsed.as_millis() as u64,
                "Group published"
            ),
        }

        let report = GroupReport {
            topic: group.topic.clone(),
            encode_failures,
            publish_error,
            attempted,
            elapsed,
        };
        if report.counts_as_publish() {
            observability::record_group_publish(
                report.publish_error.is_none(),
                attempted,
                elapsed.as_secs_f64() * 1000.0,
            );
        }
        report
    }

    fn encode_group(
        &self,
        group: &DispatchGroup,
    ) -> (Vec<BrokerMessage>, Vec<(usize, DispatcherError)>) {
        let mut messages = Vec::with_capacity(group.len());
        let mut failures = Vec::new();

        for pending in &group.events {
            match self.encoder.encode(&pending.event) {
                Ok(message) => messages.push(message),
                Err(e) => {
                    warn!(
                        topic = %group.topic,
                        event_id = %pending.event.id,
                        error = %e,
                        "Event encode failed"
                    );
                    failures.push((pending.position, e));
                }
            }
        }

        (messages, failures)
    }

    async fn send(&self, topic: &TopicId, messages: Vec<BrokerMessage>) -> Result<(), DispatcherError> {
        match tokio::time::timeout(self.timeout, self.broker.send_batch(topic, messages)).await {
            Ok(result) => result.map_err(DispatcherError::from),
            Err(_) => Err(DispatcherError::PublishTimeout {
                topic: topic.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brokers::InMemoryBroker;
    use crate::grouper::{group, PendingEvent};
    use contracts::{Event, WireFormat};

    fn make_group(events: Vec<Event>) -> DispatchGroup {
        let pending = events
            .into_iter()
            .enumerate()
            .map(|(position, event)| PendingEvent { position, event })
            .collect();
        group(pending).remove(0)
    }

    fn publisher(broker: Arc<InMemoryBroker>, max_bytes: usize) -> TopicPublisher<InMemoryBroker> {
        TopicPublisher::new(
            broker,
            MessageEncoder::new(WireFormat::Json, max_bytes),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_publish_sends_one_batch() {
        let broker = Arc::new(InMemoryBroker::new("mem"));
        let publisher = publisher(Arc::clone(&broker), 4096);

        let group = make_group(vec![
            Event::new("a", "A", "B", "C"),
            Event::new("b", "A", "B", "C"),
        ]);
        let report = publisher.publish(&group).await;

        assert!(report.is_success());
        assert_eq!(report.attempted, 2);
        assert_eq!(broker.publish_count("A_B_C"), 1);

        let batches = broker.batches();
        let keys: Vec<_> = batches[0].messages.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_encode_failure_does_not_abort_group() {
        let broker = Arc::new(InMemoryBroker::new("mem"));
        let publisher = publisher(Arc::clone(&broker), 512);

        let group = make_group(vec![
            Event::new("small", "A", "B", "C"),
            Event::new("huge", "A", "B", "C").with_payload("x".repeat(2048)),
            Event::new("small2", "A", "B", "C"),
        ]);
        let report = publisher.publish(&group).await;

        assert!(report.publish_error.is_none());
        assert_eq!(report.encode_failures.len(), 1);
        assert_eq!(report.encode_failures[0].0, 1);
        assert_eq!(report.attempted, 2);
        assert_eq!(broker.message_count(), 2);
    }

    #[tokio::test]
    async fn test_all_events_unencodable_skips_broker() {
        let broker = Arc::new(InMemoryBroker::new("mem"));
        let publisher = publisher(Arc::clone(&broker), 16);

        let group = make_group(vec![Event::new("a", "A", "B", "C")]);
        let report = publisher.publish(&group).await;

        assert!(report.publish_error.is_none());
        assert_eq!(report.encode_failures.len(), 1);
        assert!(!report.counts_as_publish());
        assert_eq!(broker.publish_count("A_B_C"), 0);
    }

    #[tokio::test]
    async fn test_broker_rejection_is_group_level() {
        let broker = Arc::new(InMemoryBroker::new("mem"));
        broker.reject_topic("A_B_C", "topic authorization failed");
        let publisher = publisher(Arc::clone(&broker), 4096);

        let group = make_group(vec![Event::new("a", "A", "B", "C")]);
        let report = publisher.publish(&group).await;

        assert!(matches!(
            report.publish_error,
            Some(DispatcherError::Contract(contracts::ContractError::BrokerRejected { .. }))
        ));
        assert!(report.encode_failures.is_empty());
    }

    #[tokio::test]
    async fn test_timeout_is_group_level() {
        let broker = Arc::new(InMemoryBroker::new("mem"));
        broker.set_latency(Duration::from_millis(500));
        let publisher = TopicPublisher::new(
            Arc::clone(&broker),
            MessageEncoder::new(WireFormat::Json, 4096),
            Duration::from_millis(20),
        );

        let group = make_group(vec![Event::new("a", "A", "B", "C")]);
        let report = publisher.publish(&group).await;

        assert!(matches!(
            report.publish_error,
            Some(DispatcherError::PublishTimeout { timeout_ms: 20, .. })
        ));
        assert_eq!(broker.publish_count("A_B_C"), 0);
    }
}
