//! Load test orchestration: workers send requests, one collector aggregates.

use std::time::Duration;

use anyhow::{Context, Result};
use contracts::{DispatchOutcome, Event};
use observability::OutcomeAggregator;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::generator::random_batch;
use super::LoadTestStats;
use crate::error::RequestError;

/// Client-side timeout for one request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(1);

/// Interval between progress reports
const REPORT_INTERVAL: Duration = Duration::from_secs(5);

/// Load test configuration
#[derive(Debug, Clone)]
pub struct LoadTestConfig {
    /// Service base URL
    pub url: String,
    /// Total run time
    pub duration: Duration,
    /// Concurrent workers
    pub workers: usize,
    /// Events per request
    pub events_per_request: usize,
    /// Pause between requests per worker
    pub delay: Duration,
    /// Log every request result
    pub log_responses: bool,
}

/// Result of one request, sent from a worker to the collector
#[derive(Debug)]
enum RequestResult {
    Response {
        outcome: DispatchOutcome,
        latency: Duration,
    },
    Failed(RequestError),
}

/// Load generator
pub struct LoadTest {
    config: LoadTestConfig,
    client: reqwest::Client,
}

impl LoadTest {
    pub fn new(config: LoadTestConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &LoadTestConfig {
        &self.config
    }

    /// Fail fast if the service is not reachable
    pub async fn check_health(&self) -> Result<()> {
        let url = format!("{}/protected/health", self.config.url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Service not reachable at {url}"))?;

        if !response.status().is_success() {
            anyhow::bail!("Health check returned HTTP {}", response.status());
        }
        info!(url = %url, "Health check passed");
        Ok(())
    }

    /// Run workers until the configured duration elapses
    pub async fn run(self) -> Result<LoadTestStats> {
        let started = Instant::now();
        let deadline = started + self.config.duration;
        let (tx, rx) = mpsc::channel(self.config.workers.max(1) * 4);

        info!(
            workers = self.config.workers,
            duration_secs = self.config.duration.as_secs(),
            url = %self.config.url,
            "Starting load test"
        );

        let mut workers = Vec::with_capacity(self.config.workers);
        for worker_id in 0..self.config.workers {
            workers.push(tokio::spawn(worker(
                worker_id,
                self.client.clone(),
                self.config.clone(),
                deadline,
                tx.clone(),
            )));
        }
        // Collector ends once every worker has dropped its sender
        drop(tx);

        let aggregator = collect(rx, started, self.config.log_responses).await;

        for handle in workers {
            if let Err(e) = handle.await {
                warn!(error = %e, "Worker task aborted");
            }
        }

        Ok(LoadTestStats {
            aggregator,
            elapsed: started.elapsed(),
            config: self.config,
        })
    }
}

async fn worker(
    worker_id: usize,
    client: reqwest::Client,
    config: LoadTestConfig,
    deadline: Instant,
    tx: mpsc::Sender<RequestResult>,
) {
    debug!(worker_id, "Worker started");
    let url = format!("{}/events", config.url);

    while Instant::now() < deadline {
        let events = random_batch(config.events_per_request);
        let result = match send_request(&client, &url, &events).await {
            Ok((outcome, latency)) => RequestResult::Response { outcome, latency },
            Err(e) => RequestResult::Failed(e),
        };

        if tx.send(result).await.is_err() {
            break;
        }
        tokio::time::sleep(config.delay).await;
    }

    debug!(worker_id, "Worker stopped");
}

async fn send_request(
    client: &reqwest::Client,
    url: &str,
    events: &[Event],
) -> Result<(DispatchOutcome, Duration), RequestError> {
    let start = Instant::now();
    let response = client.post(url).json(events).send().await?;
    let latency = start.elapsed();

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RequestError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let outcome = response.json::<DispatchOutcome>().await?;
    Ok((outcome, latency))
}

/// Aggregate worker results, printing progress every few seconds
async fn collect(
    mut rx: mpsc::Receiver<RequestResult>,
    started: Instant,
    log_responses: bool,
) -> OutcomeAggregator {
    let mut aggregator = OutcomeAggregator::new();
    let mut ticker = tokio::time::interval_at(started + REPORT_INTERVAL, REPORT_INTERVAL);

    loop {
        tokio::select! {
            result = rx.recv() => match result {
                Some(result) => record(&mut aggregator, result, log_responses),
                None => break,
            },
            _ = ticker.tick() => {
                LoadTestStats::print_progress(&aggregator, started.elapsed());
            }
        }
    }

    aggregator
}

fn record(aggregator: &mut OutcomeAggregator, result: RequestResult, log_responses: bool) {
    match result {
        RequestResult::Response { outcome, latency } => {
            if log_responses {
                info!(
                    success = outcome.succeeded.len(),
                    failed = outcome.failed.len(),
                    invalid = outcome.invalid.len(),
                    latency_ms = latency.as_millis() as u64,
                    "Request successful"
                );
            }
            aggregator.record_response(&outcome, latency.as_secs_f64() * 1000.0);
        }
        RequestResult::Failed(e) => {
            if log_responses {
                warn!(error = %e, "Request failed");
            }
            aggregator.record_failure(e.is_timeout());
        }
    }
}
