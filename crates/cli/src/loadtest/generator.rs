//! Random event generation.

use chrono::{SecondsFormat, Utc};
use contracts::Event;
use rand::Rng;

const DOMAINS: &[&str] = &["Banking"];
const SUBDOMAINS: &[&str] = &["Domestic"];
const CODES: &[&str] = &["Created"];

/// Build one random, fully populated event
pub fn random_event<R: Rng + ?Sized>(rng: &mut R) -> Event {
    let now = Utc::now();
    let nanos = now.timestamp_nanos_opt().unwrap_or_default();

    Event {
        event_timestamp: nanos,
        event_time: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        id: format!("load-test-{}-{}", rng.random_range(0..100_000), nanos),
        domain: pick(rng, DOMAINS),
        subdomain: pick(rng, SUBDOMAINS),
        code: pick(rng, CODES),
        version: "1.0".to_string(),
        branch_id: rng.random_range(1_000..10_000),
        channel_id: rng.random_range(0..100),
        customer_id: rng.random_range(100_000..1_100_000),
        user_id: rng.random_range(10_000..110_000),
        payload: format!("Load test payload {}", rng.random_range(0..10_000)),
    }
}

/// Build a request body of `count` random events
pub fn random_batch(count: usize) -> Vec<Event> {
    let mut rng = rand::rng();
    (0..count).map(|_| random_event(&mut rng)).collect()
}

fn pick<R: Rng + ?Sized>(rng: &mut R, values: &[&str]) -> String {
    values[rng.random_range(0..values.len())].to_string()
}
