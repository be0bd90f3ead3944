//! Result reconciliation
//!
//! Merges validation results, per-event encode errors and per-topic publish
//! errors into one [`DispatchOutcome`].

use std::collections::{HashMap, HashSet};

use contracts::{DispatchOutcome, Event, EventStatus, TopicId};

use crate::topic::resolve_topic;

/// Classify every input event and collapse the result by identifier.
///
/// Priority per event: invalid, then own encode error, then its topic's
/// publish error, otherwise succeeded. Positions index into `inputs`.
///
/// When several events share an identifier, the classification of the last
/// occurrence wins and the identifier is listed once.
pub fn reconcile<E1, E2>(
    inputs: &[Event],
    invalid: &HashSet<usize>,
    event_errors: &HashMap<usize, E1>,
    topic_errors: &HashMap<TopicId, E2>,
) -> DispatchOutcome {
    let statuses = inputs.iter().enumerate().map(|(position, event)| {
        if invalid.contains(&position) {
            EventStatus::Invalid
        } else if event_errors.contains_key(&position) {
            EventStatus::Failed
        } else if topic_errors.contains_key(resolve_topic(event).as_str()) {
            EventStatus::Failed
        } else {
            EventStatus::Succeeded
        }
    });

    collapse_by_id(inputs, statuses)
}

fn collapse_by_id(inputs: &[Event], statuses: impl Iterator<Item = EventStatus>) -> DispatchOutcome {
    let mut last_position: HashMap<&str, usize> = HashMap::with_capacity(inputs.len());
    for (position, event) in inputs.iter().enumerate() {
        last_position.insert(event.id.as_str(), position);
    }

    let mut outcome = DispatchOutcome::default();
    for (position, (event, status)) in inputs.iter().zip(statuses).enumerate() {
        if last_position.get(event.id.as_str()) == Some(&position) {
            outcome.push(event.id.as_str(), status);
        }
    }
    outcome
}
