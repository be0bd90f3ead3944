//! `loadtest` command implementation.

use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::cli::LoadtestArgs;
use crate::loadtest::{LoadTest, LoadTestConfig};

/// Execute the `loadtest` command
///
/// Per-request results are logged when the global `-v` flag is set.
pub async fn run_loadtest(args: &LoadtestArgs, verbose: bool) -> Result<()> {
    if args.workers == 0 {
        anyhow::bail!("--workers must be at least 1");
    }

    let config = LoadTestConfig {
        url: args.url.trim_end_matches('/').to_string(),
        duration: Duration::from_secs(args.duration),
        workers: args.workers,
        events_per_request: args.events,
        delay: Duration::from_millis(args.delay_ms),
        log_responses: verbose,
    };

    let load_test = LoadTest::new(config)?;
    load_test.check_health().await?;

    println!(
        "Starting load test with {} workers for {} seconds...",
        load_test.config().workers,
        args.duration
    );
    println!("Target API: {}", load_test.config().url);

    let stats = load_test.run().await?;
    stats.print_summary();

    info!(
        requests = stats.aggregator.total_requests,
        events = stats.aggregator.total_events(),
        elapsed_secs = stats.elapsed.as_secs_f64(),
        "Load test completed"
    );
    Ok(())
}
