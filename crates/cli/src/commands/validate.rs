//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{BrokerKind, ServiceConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Publish timeouts above this are accepted but flagged
const LONG_PUBLISH_TIMEOUT_MS: u64 = 60_000;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    listen_addr: String,
    broker_kind: String,
    endpoint_count: usize,
    publish_timeout_ms: u64,
    wire_format: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", config.version),
                    listen_addr: config.server.listen_addr(),
                    broker_kind: format!("{:?}", config.broker.kind),
                    endpoint_count: config.broker.endpoints.len(),
                    publish_timeout_ms: config.dispatch.publish_timeout_ms,
                    wire_format: format!("{:?}", config.dispatch.wire_format),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &ServiceConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    match config.broker.kind {
        BrokerKind::Memory => warnings
            .push("broker.kind = memory - published events are kept in process only".to_string()),
        BrokerKind::Log => {
            warnings.push("broker.kind = log - events are logged, not delivered".to_string())
        }
        BrokerKind::Network => {}
    }

    if config.dispatch.publish_timeout_ms > LONG_PUBLISH_TIMEOUT_MS {
        warnings.push(format!(
            "dispatch.publish_timeout_ms = {} - requests may block for over a minute",
            config.dispatch.publish_timeout_ms
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Listen: {}", summary.listen_addr);
            println!("  Broker: {}", summary.broker_kind);
            println!("  Endpoints: {}", summary.endpoint_count);
            println!("  Publish timeout: {} ms", summary.publish_timeout_ms);
            println!("  Wire format: {}", summary.wire_format);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
