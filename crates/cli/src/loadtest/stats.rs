//! Load test statistics and reports.

use std::time::Duration;

use observability::OutcomeAggregator;

use super::LoadTestConfig;

const SEPARATOR: &str =
    "================================================================================";

/// Statistics from a load test run
#[derive(Debug, Clone)]
pub struct LoadTestStats {
    /// Aggregated request and event counts
    pub aggregator: OutcomeAggregator,

    /// Wall time of the run
    pub elapsed: Duration,

    /// Configuration the run used
    pub config: LoadTestConfig,
}

impl LoadTestStats {
    /// Requests per second over the whole run
    pub fn requests_per_second(&self) -> f64 {
        rate(self.aggregator.total_requests, self.elapsed)
    }

    /// Events per second over the whole run
    pub fn events_per_second(&self) -> f64 {
        rate(self.aggregator.total_events(), self.elapsed)
    }

    /// Print an interim report
    pub fn print_progress(aggregator: &OutcomeAggregator, elapsed: Duration) {
        let summary = aggregator.summary();
        println!(
            "\n=== Load Test Statistics (Elapsed: {}s) ===",
            elapsed.as_secs()
        );
        println!(
            "Throughput: {:.2} req/sec, {:.2} events/sec",
            rate(summary.total_requests, elapsed),
            rate(summary.total_events, elapsed)
        );
        print!("{}", summary);
    }

    /// Print the final report
    pub fn print_summary(&self) {
        let summary = self.aggregator.summary();

        println!("\n{}", SEPARATOR);
        println!("                         LOAD TEST FINAL REPORT");
        println!("{}", SEPARATOR);

        println!("Test Configuration:");
        println!("  Duration: {} seconds", self.config.duration.as_secs());
        println!("  Workers: {}", self.config.workers);
        println!("  Events per request: {}", self.config.events_per_request);
        println!("  Request delay: {} ms", self.config.delay.as_millis());
        println!("  API URL: {}", self.config.url);

        println!("\nRequest Statistics:");
        println!("  Total requests: {}", summary.total_requests);
        println!("  Successful requests: {}", summary.success_requests);
        println!("  Failed requests: {}", summary.failed_requests);
        println!("  Timeout requests: {}", summary.timeout_requests);
        println!("  Requests per second: {:.2}", self.requests_per_second());
        println!("  Success rate: {:.2}%", summary.request_success_rate);
        if summary.timeout_requests > 0 {
            println!("  Timeout rate: {:.2}%", summary.timeout_rate);
        }

        println!("\nEvent Statistics:");
        println!("  Total events: {}", summary.total_events);
        println!("  Successful events: {}", summary.success_events);
        println!("  Failed events: {}", summary.failed_events);
        println!("  Invalid events: {}", summary.invalid_events);
        println!("  Events per second: {:.2}", self.events_per_second());
        println!("  Event success rate: {:.2}%", summary.event_success_rate);

        println!("\nLatency Statistics (ms):");
        if summary.latency_ms.count == 0 {
            println!("  No successful requests");
        } else {
            println!("  Average latency: {:.1}", summary.latency_ms.mean);
            println!("  Minimum latency: {:.1}", summary.latency_ms.min);
            println!("  Maximum latency: {:.1}", summary.latency_ms.max);
            println!("  Std deviation: {:.1}", summary.latency_ms.std_dev);
        }

        println!("{}", SEPARATOR);
    }
}

fn rate(count: u64, elapsed: Duration) -> f64 {
    if elapsed.as_secs_f64() > 0.0 {
        count as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    }
}
