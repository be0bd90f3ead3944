//! Event - dispatch input
//!
//! A single business event as submitted by the caller.

use serde::{Deserialize, Serialize};

/// Business event
///
/// Only `id`, `domain`, `subdomain` and `code` are interpreted. Every field
/// falls back to its default when absent, so a missing required key is
/// reported as an invalid event rather than a malformed request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    /// Producer-assigned timestamp
    #[serde(rename = "eventtimestamp")]
    pub event_timestamp: i64,

    /// Human-readable timestamp
    #[serde(rename = "eventtime")]
    pub event_time: String,

    /// Caller-supplied identifier (correlation key)
    pub id: String,

    /// Classification: domain
    pub domain: String,

    /// Classification: subdomain
    pub subdomain: String,

    /// Classification: code
    pub code: String,

    pub version: String,

    #[serde(rename = "branchid")]
    pub branch_id: i64,

    #[serde(rename = "channelid")]
    pub channel_id: i64,

    #[serde(rename = "customerid")]
    pub customer_id: i64,

    #[serde(rename = "userid")]
    pub user_id: i64,

    /// Opaque payload blob
    pub payload: String,
}

impl Event {
    /// Create an event carrying only the routing and correlation fields
    pub fn new(
        id: impl Into<String>,
        domain: impl Into<String>,
        subdomain: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            domain: domain.into(),
            subdomain: subdomain.into(),
            code: code.into(),
            ..Default::default()
        }
    }

    /// Builder-style payload setter
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = payload.into();
        self
    }
}
