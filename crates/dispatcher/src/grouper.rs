//! Per-topic grouping of validated events

use std::collections::HashMap;

use contracts::{Event, TopicId};

use crate::topic::resolve_topic;

/// A validated event together with its position in the original batch
#[derive(Debug, Clone)]
pub struct PendingEvent {
    pub position: usize,
    pub event: Event,
}

/// Events of one batch that share a topic, in input order
#[derive(Debug, Clone)]
pub struct DispatchGroup {
    pub topic: TopicId,
    pub events: Vec<PendingEvent>,
}

impl DispatchGroup {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Partition events by resolved topic.
///
/// Groups come out in order of their topic's first appearance, and each group
/// keeps the relative order of its events.
pub fn group(events: Vec<PendingEvent>) -> Vec<DispatchGroup> {
    let mut index: HashMap<TopicId, usize> = HashMap::new();
    let mut groups: Vec<DispatchGroup> = Vec::new();

    for pending in events {
        let topic = resolve_topic(&pending.event);
        match index.get(topic.as_str()) {
            Some(&slot) => groups[slot].events.push(pending),
            None => {
                index.insert(topic.clone(), groups.len());
                groups.push(DispatchGroup {
                    topic,
                    events: vec![pending],
                });
            }
        }
    }

    groups
}
