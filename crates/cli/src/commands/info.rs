//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::ServiceConfig;
use serde::Serialize;
use tracing::info;

use super::load_effective_config;
use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    listen_addr: String,
    max_body_bytes: usize,
    broker: BrokerInfo,
    dispatch: DispatchInfo,
}

#[derive(Serialize)]
struct BrokerInfo {
    kind: String,
    endpoints: Vec<String>,
    connect_timeout_ms: u64,
}

#[derive(Serialize)]
struct DispatchInfo {
    publish_timeout_ms: u64,
    max_message_bytes: usize,
    wire_format: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!("Loading configuration info");

    let config = load_effective_config(&args.config)?;

    if args.json {
        let info = build_config_info(&config);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config);
    }

    Ok(())
}

fn build_config_info(config: &ServiceConfig) -> ConfigInfo {
    ConfigInfo {
        version: format!("{:?}", config.version),
        listen_addr: config.server.listen_addr(),
        max_body_bytes: config.server.max_body_bytes,
        broker: BrokerInfo {
            kind: format!("{:?}", config.broker.kind),
            endpoints: config.broker.endpoints.clone(),
            connect_timeout_ms: config.broker.connect_timeout_ms,
        },
        dispatch: DispatchInfo {
            publish_timeout_ms: config.dispatch.publish_timeout_ms,
            max_message_bytes: config.dispatch.max_message_bytes,
            wire_format: format!("{:?}", config.dispatch.wire_format),
        },
    }
}

fn print_config_info(config: &ServiceConfig) {
    println!("\n=== Event Dispatcher Configuration ===\n");
    println!("Version: {:?}", config.version);
    println!("Listen: {}", config.server.listen_addr());
    println!("Max body size: {} bytes", config.server.max_body_bytes);

    println!("\nBroker:");
    println!("  Kind: {:?}", config.broker.kind);
    println!("  Connect timeout: {} ms", config.broker.connect_timeout_ms);
    println!("  Endpoints ({}):", config.broker.endpoints.len());
    for endpoint in &config.broker.endpoints {
        println!("    - {}", endpoint);
    }

    println!("\nDispatch:");
    println!("  Publish timeout: {} ms", config.dispatch.publish_timeout_ms);
    println!("  Max message size: {} bytes", config.dispatch.max_message_bytes);
    println!("  Wire format: {:?}", config.dispatch.wire_format);

    println!();
}
