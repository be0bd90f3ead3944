//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Routing Model
//! - An [`Event`] is routed by its `(domain, subdomain, code)` triple only
//! - Everything else on the event is opaque and forwarded unchanged
//! - The event `id` is the sole correlation key between a request and its [`DispatchOutcome`]

mod broker;
mod error;
mod event;
mod outcome;
mod service_config;
mod topic_id;

pub use broker::*;
pub use error::*;
pub use event::*;
pub use outcome::*;
pub use service_config::*;
pub use topic_id::{TopicId, TOPIC_SEPARATOR};
