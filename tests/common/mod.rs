//! Common functionality shared between tests.

// Different tests may use only a subset of the available functionality
#![allow(dead_code)]

use pasta_equivalence::{Config, Report};

/// Seed shared by every test run, so failures reproduce.
pub const SEED: [u8; 32] = *b"pasta-equivalence test seed 0001";

pub fn init_tracing() {
    let _ = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Deterministic configuration with `trials` trials per operation.
pub fn config(trials: u32) -> Config {
    Config::default().with_seed(SEED).with_trials(trials)
}

/// Name of every failing operation in `report`.
pub fn failing(report: &Report) -> Vec<&str> {
    report
        .operations
        .iter()
        .filter(|op| !op.outcome.is_passed())
        .map(|op| op.name.as_str())
        .collect()
}
