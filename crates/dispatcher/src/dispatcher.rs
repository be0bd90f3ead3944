//! EventDispatcher - validate, group, publish per topic, reconcile

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use contracts::{
    BrokerConfig, BrokerKind, DispatchOutcome, DispatchSettings, Event, MessageBroker,
    ServiceConfig, TopicId,
};

use crate::brokers::{AnyBroker, InMemoryBroker, LogBroker, NetworkBroker, NetworkBrokerConfig};
use crate::encoder::MessageEncoder;
use crate::error::DispatcherError;
use crate::grouper::{group, PendingEvent};
use crate::metrics::{DispatchMetrics, MetricsSnapshot};
use crate::publisher::{GroupReport, TopicPublisher};
use crate::reconcile::reconcile;
use crate::validate::validate;

/// Dispatcher configuration
#[derive(Debug, Clone, Default)]
pub struct DispatcherConfig {
    /// Broker transport
    pub broker: BrokerConfig,
    /// Publish behaviour
    pub dispatch: DispatchSettings,
}

impl From<&ServiceConfig> for DispatcherConfig {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            broker: config.broker.clone(),
            dispatch: config.dispatch.clone(),
        }
    }
}

/// Builder for creating an EventDispatcher from configuration
pub struct DispatcherBuilder {
    config: DispatcherConfig,
}

impl DispatcherBuilder {
    pub fn new(config: DispatcherConfig) -> Self {
        Self { config }
    }

    /// Create the configured broker and wrap it in a dispatcher
    #[instrument(name = "dispatcher_builder_build", skip(self))]
    pub fn build(self) -> Result<EventDispatcher<AnyBroker>, DispatcherError> {
        let broker = create_broker(&self.config.broker)?;
        Ok(EventDispatcher::new(broker, &self.config.dispatch))
    }
}

/// Create a broker from configuration
#[instrument(
    name = "dispatcher_create_broker",
    skip(config),
    fields(kind = ?config.kind)
)]
pub fn create_broker(config: &BrokerConfig) -> Result<AnyBroker, DispatcherError> {
    match config.kind {
        BrokerKind::Memory => Ok(AnyBroker::Memory(InMemoryBroker::new("memory"))),
        BrokerKind::Log => Ok(AnyBroker::Log(LogBroker::new("log"))),
        BrokerKind::Network => {
            if config.endpoints.is_empty() {
                return Err(DispatcherError::broker_creation(
                    "network",
                    "no endpoints configured",
                ));
            }
            let network_config = NetworkBrokerConfig::from_broker_config(config);
            Ok(AnyBroker::Network(NetworkBroker::new("network", network_config)))
        }
    }
}

/// Dispatches event batches to a broker, one publish per topic
///
/// Each call is independent: group outcomes come back through the publish
/// tasks' join handles and nothing outlives the call except the metrics
/// counters.
pub struct EventDispatcher<B> {
    publisher: Arc<TopicPublisher<B>>,
    metrics: Arc<DispatchMetrics>,
}

impl<B> EventDispatcher<B>
where
    B: MessageBroker + Send + Sync + 'static,
{
    pub fn new(broker: B, settings: &DispatchSettings) -> Self {
        Self::with_shared_broker(Arc::new(broker), settings)
    }

    /// Create a dispatcher over a broker the caller keeps a handle to
    pub fn with_shared_broker(broker: Arc<B>, settings: &DispatchSettings) -> Self {
        let publisher = TopicPublisher::new(
            broker,
            MessageEncoder::from_settings(settings),
            settings.publish_timeout(),
        );
        Self {
            publisher: Arc::new(publisher),
            metrics: Arc::new(DispatchMetrics::new()),
        }
    }

    pub fn broker(&self) -> &Arc<B> {
        self.publisher.broker()
    }

    /// Get metrics snapshot
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Dispatch one batch and classify every event identifier
    ///
    /// Never fails: validation, encode and publish errors all end up in the
    /// `invalid` or `failed` sets.
    #[instrument(name = "dispatcher_dispatch", skip(self, events), fields(events = events.len()))]
    pub async fn dispatch(&self, events: Vec<Event>) -> DispatchOutcome {
        let mut invalid = HashSet::new();
        let mut pending = Vec::with_capacity(events.len());
        for (position, event) in events.iter().enumerate() {
            if validate(event) {
                pending.push(PendingEvent {
                    position,
                    event: event.clone(),
                });
            } else {
                debug!(event_id = %event.id, position, "Event failed validation");
                invalid.insert(position);
            }
        }

        let groups = group(pending);
        let group_count = groups.len();

        let handles: Vec<(TopicId, JoinHandle<GroupReport>)> = groups
            .into_iter()
            .map(|group| {
                let publisher = Arc::clone(&self.publisher);
                let topic = group.topic.clone();
                let handle = tokio::spawn(async move { publisher.publish(&group).await });
                (topic, handle)
            })
            .collect();

        let mut event_errors = HashMap::new();
        let mut topic_errors = HashMap::new();

        for (topic, handle) in handles {
            let report = match handle.await {
                Ok(report) => report,
                Err(e) => {
                    warn!(topic = %topic, error = %e, "Publish task aborted");
                    GroupReport::aborted(topic, e.to_string())
                }
            };
            self.metrics.record_group(&report);

            for (position, error) in report.encode_failures {
                event_errors.insert(position, error);
            }
            if let Some(error) = report.publish_error {
                topic_errors.insert(report.topic, error);
            }
        }

        let outcome = reconcile(&events, &invalid, &event_errors, &topic_errors);

        self.metrics.record_outcome(&outcome);
        observability::record_dispatch_outcome(&outcome);

        info!(
            events = events.len(),
            topics = group_count,
            succeeded = outcome.succeeded.len(),
            invalid = outcome.invalid.len(),
            failed = outcome.failed.len(),
            "Batch dispatched"
        );

        outcome
    }

    /// Close the broker
    #[instrument(name = "dispatcher_shutdown", skip(self))]
    pub async fn shutdown(&self) -> Result<(), DispatcherError> {
        self.broker().close().await?;
        info!(broker = %self.broker().name(), "Dispatcher shutdown complete");
        Ok(())
    }
}
