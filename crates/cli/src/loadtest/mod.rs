//! Load generator for a running dispatch service.

mod generator;
mod runner;
mod stats;

pub use runner::{LoadTest, LoadTestConfig};
pub use stats::LoadTestStats;
