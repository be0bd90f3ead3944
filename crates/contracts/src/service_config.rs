//! ServiceConfig - Config Loader 输出
//!
//! 描述完整的服务配置：HTTP 监听、Broker 连接、分发策略。

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的服务配置
///
/// 所有字段均有默认值，空配置文件即为合法配置。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// HTTP 监听设置
    #[serde(default)]
    pub server: ServerConfig,

    /// Broker 连接设置
    #[serde(default)]
    pub broker: BrokerConfig,

    /// 分发策略
    #[serde(default)]
    pub dispatch: DispatchSettings,
}

/// HTTP 监听配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 单个请求体上限 (字节)，超出时整体拒绝 (413)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// `host:port` 形式的监听地址
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_bytes() -> usize {
    64 * 1024 * 1024
}

/// Broker 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Broker 类型
    #[serde(default)]
    pub kind: BrokerKind,

    /// Broker 地址列表 (按顺序尝试)
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,

    /// 建立连接超时 (毫秒)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            kind: BrokerKind::default(),
            endpoints: default_endpoints(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl BrokerConfig {
    /// 解析逗号分隔的地址列表 (e.g. `KAFKA_BROKERS`)
    pub fn parse_endpoints(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

fn default_endpoints() -> Vec<String> {
    vec!["localhost:9092".to_string()]
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

/// Broker 类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrokerKind {
    /// 进程内存 (测试/演示)
    Memory,
    /// 日志输出
    Log,
    /// TCP 中继
    #[default]
    Network,
}

/// 分发策略配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchSettings {
    /// 单个 topic 发布超时 (毫秒)
    #[serde(default = "default_publish_timeout_ms")]
    pub publish_timeout_ms: u64,

    /// 单条消息最大字节数
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,

    /// 消息编码格式
    #[serde(default)]
    pub wire_format: WireFormat,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            publish_timeout_ms: default_publish_timeout_ms(),
            max_message_bytes: default_max_message_bytes(),
            wire_format: WireFormat::default(),
        }
    }
}

impl DispatchSettings {
    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }
}

fn default_publish_timeout_ms() -> u64 {
    30_000 // 30s
}

fn default_max_message_bytes() -> usize {
    1_048_576 // 1MiB
}

/// 消息编码格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    /// JSON (与原始事件结构一致)
    #[default]
    Json,
    /// Bincode (紧凑二进制)
    Bincode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.max_body_bytes, 67_108_864);
        assert_eq!(config.broker.endpoints, vec!["localhost:9092"]);
        assert_eq!(config.broker.kind, BrokerKind::Network);
        assert_eq!(config.dispatch.publish_timeout(), Duration::from_secs(30));
        assert_eq!(config.dispatch.max_message_bytes, 1_048_576);
    }

    #[test]
    fn test_parse_endpoints() {
        assert_eq!(
            BrokerConfig::parse_endpoints("a:9092, b:9092,,"),
            vec!["a:9092".to_string(), "b:9092".to_string()]
        );
        assert!(BrokerConfig::parse_endpoints("").is_empty());
    }
}
