//! # Dispatcher
//!
//! 事件分发模块。
//!
//! 负责：
//! - 校验事件必填字段
//! - 按 `domain_subdomain_code` 分组
//! - 每个 topic 一次批量发布，独立超时
//! - 汇总为 succeeded / invalid / failed 三个集合

pub mod brokers;
pub mod dispatcher;
pub mod encoder;
pub mod error;
pub mod grouper;
pub mod metrics;
pub mod publisher;
pub mod reconcile;
pub mod topic;
pub mod validate;

pub use brokers::{AnyBroker, InMemoryBroker, LogBroker, NetworkBroker, NetworkBrokerConfig};
pub use contracts::{DispatchOutcome, Event, MessageBroker};
pub use dispatcher::{create_broker, DispatcherBuilder, DispatcherConfig, EventDispatcher};
pub use error::DispatcherError;
pub use metrics::{DispatchMetrics, MetricsSnapshot};
