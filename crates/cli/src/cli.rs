//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Event Dispatcher - validates event batches and publishes them per topic
#[derive(Parser, Debug)]
#[command(
    name = "event-dispatcher",
    author,
    version,
    about = "Event batch dispatch service",
    long_about = "Receives batches of business events over HTTP, validates them, routes each \n\
                  event to a topic derived from its domain, subdomain and code, and publishes \n\
                  one batch per topic. Every event id is reported as succeeded, invalid or failed."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "EVENT_DISPATCHER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "EVENT_DISPATCHER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP dispatch service
    Serve(ServeArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display the effective configuration
    Info(InfoArgs),

    /// Generate load against a running service
    Loadtest(LoadtestArgs),
}

/// Configuration source and overrides shared by `serve` and `info`
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to configuration file (TOML or JSON); defaults apply when omitted
    #[arg(short, long, env = "EVENT_DISPATCHER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override listen host
    #[arg(long)]
    pub host: Option<String>,

    /// Override listen port
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Override broker endpoints (comma separated)
    #[arg(long, env = "KAFKA_BROKERS")]
    pub brokers: Option<String>,

    /// Override broker transport
    #[arg(long, value_enum)]
    pub broker_kind: Option<BrokerKindArg>,

    /// Override per-topic publish timeout in milliseconds
    #[arg(long)]
    pub publish_timeout_ms: Option<u64>,
}

/// Arguments for the `serve` command
#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "EVENT_DISPATCHER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `loadtest` command
#[derive(Parser, Debug, Clone)]
pub struct LoadtestArgs {
    /// Service base URL
    #[arg(long, default_value = "http://localhost:8080")]
    pub url: String,

    /// Test duration in seconds
    #[arg(long, default_value = "30")]
    pub duration: u64,

    /// Number of concurrent workers
    #[arg(long, default_value = "10")]
    pub workers: usize,

    /// Events per request
    #[arg(long, default_value = "1")]
    pub events: usize,

    /// Delay between requests per worker, in milliseconds
    #[arg(long, default_value = "100")]
    pub delay_ms: u64,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

/// Broker transport selectable from the command line
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum BrokerKindArg {
    Memory,
    Log,
    Network,
}

impl From<BrokerKindArg> for contracts::BrokerKind {
    fn from(kind: BrokerKindArg) -> Self {
        match kind {
            BrokerKindArg::Memory => Self::Memory,
            BrokerKindArg::Log => Self::Log,
            BrokerKindArg::Network => Self::Network,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from([
            "event-dispatcher",
            "serve",
            "--port",
            "9090",
            "--brokers",
            "a:1,b:2",
            "--broker-kind",
            "memory",
        ])
        .unwrap();

        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.config.port, Some(9090));
                assert_eq!(args.config.brokers.as_deref(), Some("a:1,b:2"));
                assert!(matches!(args.config.broker_kind, Some(BrokerKindArg::Memory)));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_loadtest_defaults() {
        let cli = Cli::try_parse_from(["event-dispatcher", "loadtest"]).unwrap();

        match cli.command {
            Commands::Loadtest(args) => {
                assert_eq!(args.url, "http://localhost:8080");
                assert_eq!(args.workers, 10);
                assert_eq!(args.events, 1);
                assert_eq!(args.delay_ms, 100);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
