//! Command implementations.

mod info;
mod loadtest;
mod serve;
mod validate;

pub use info::run_info;
pub use loadtest::run_loadtest;
pub use serve::run_serve;
pub use validate::run_validate;

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::{BrokerConfig, ServiceConfig};
use tracing::info;

use crate::cli::ConfigArgs;

/// Load the configuration file (or defaults) and apply command-line and
/// environment overrides, then validate the result
pub(crate) fn load_effective_config(args: &ConfigArgs) -> Result<ServiceConfig> {
    if let Some(ref path) = args.config {
        info!(config = %path.display(), "Loading configuration");
        if !path.exists() {
            anyhow::bail!("Configuration file not found: {}", path.display());
        }
    }

    let mut config = ConfigLoader::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;

    apply_overrides(&mut config, args);

    ConfigLoader::validate(&config).context("Configuration is invalid after overrides")?;
    Ok(config)
}

fn apply_overrides(config: &mut ServiceConfig, args: &ConfigArgs) {
    if let Some(ref host) = args.host {
        info!(host = %host, "Overriding listen host");
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        info!(port, "Overriding listen port");
        config.server.port = port;
    }
    if let Some(ref brokers) = args.brokers {
        config.broker.endpoints = BrokerConfig::parse_endpoints(brokers);
        info!(endpoints = ?config.broker.endpoints, "Overriding broker endpoints");
    }
    if let Some(kind) = args.broker_kind {
        config.broker.kind = kind.into();
        info!(kind = ?config.broker.kind, "Overriding broker transport");
    }
    if let Some(timeout_ms) = args.publish_timeout_ms {
        info!(timeout_ms, "Overriding publish timeout");
        config.dispatch.publish_timeout_ms = timeout_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::BrokerKindArg;
    use contracts::BrokerKind;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = load_effective_config(&ConfigArgs::default()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.broker.endpoints, vec!["localhost:9092"]);
    }

    #[test]
    fn test_overrides_beat_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 7000\n\n[broker]\nendpoints = [\"file:9092\"]\n"
        )
        .unwrap();

        let args = ConfigArgs {
            config: Some(file.path().to_path_buf()),
            port: Some(9000),
            brokers: Some("a:1, b:2".to_string()),
            broker_kind: Some(BrokerKindArg::Log),
            ..Default::default()
        };

        let config = load_effective_config(&args).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.broker.endpoints, vec!["a:1", "b:2"]);
        assert_eq!(config.broker.kind, BrokerKind::Log);
    }

    #[test]
    fn test_file_values_used_without_overrides() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[dispatch]\npublish_timeout_ms = 1500\n").unwrap();

        let args = ConfigArgs {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };

        let config = load_effective_config(&args).unwrap();
        assert_eq!(config.dispatch.publish_timeout_ms, 1500);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = ConfigArgs {
            brokers: Some(" , ".to_string()),
            ..Default::default()
        };
        assert!(load_effective_config(&args).is_err());
    }

    #[test]
    fn test_missing_file_rejected() {
        let args = ConfigArgs {
            config: Some("/nonexistent/dispatcher.toml".into()),
            ..Default::default()
        };
        assert!(load_effective_config(&args).is_err());
    }
}
