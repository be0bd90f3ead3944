//! DispatchOutcome - dispatch output
//!
//! Three-way classification of a batch's event identifiers.

use serde::{Deserialize, Serialize};

/// Per-event classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventStatus {
    /// Published to its topic
    Succeeded,
    /// Missing a required field, never attempted
    Invalid,
    /// Encode or publish failure
    Failed,
}

impl EventStatus {
    /// Label used for logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Invalid => "invalid",
            Self::Failed => "failed",
        }
    }
}

/// Final result of one dispatch call
///
/// Each input identifier appears in exactly one of the three lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    #[serde(rename = "successEventIds", default)]
    pub succeeded: Vec<String>,

    #[serde(rename = "invalidEventIds", default)]
    pub invalid: Vec<String>,

    #[serde(rename = "failedEventIds", default)]
    pub failed: Vec<String>,
}

impl DispatchOutcome {
    /// Append an identifier to the list matching `status`
    pub fn push(&mut self, id: impl Into<String>, status: EventStatus) {
        let id = id.into();
        match status {
            EventStatus::Succeeded => self.succeeded.push(id),
            EventStatus::Invalid => self.invalid.push(id),
            EventStatus::Failed => self.failed.push(id),
        }
    }

    /// Total number of classified identifiers
    pub fn len(&self) -> usize {
        self.succeeded.len() + self.invalid.len() + self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up the classification of an identifier
    pub fn status_of(&self, id: &str) -> Option<EventStatus> {
        if self.succeeded.iter().any(|s| s == id) {
            Some(EventStatus::Succeeded)
        } else if self.invalid.iter().any(|s| s == id) {
            Some(EventStatus::Invalid)
        } else if self.failed.iter().any(|s| s == id) {
            Some(EventStatus::Failed)
        } else {
            None
        }
    }
}
