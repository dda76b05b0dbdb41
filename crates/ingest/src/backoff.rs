//! Reconnect backoff policy
//!
//! Exponential delay growth with a hard cap and a little jitter so a fleet
//! of nodes does not reconnect in lockstep. The attempt counter resets on a
//! successful connect; when a finite budget is configured, exhausting it
//! yields `None` and the adapter transitions to its terminal failed state.

use gridwatch_core::RetryConfig;
use rand::Rng;
use std::time::Duration;

/// Mutable backoff state for one connection.
#[derive(Debug)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
    attempts: u32,
    budget: Option<u32>,
}

impl Backoff {
    /// Build backoff state from the configured retry policy.
    pub fn new(config: &RetryConfig) -> Self {
        let initial = Duration::from_millis(config.initial_backoff_ms);
        Self {
            initial,
            max: Duration::from_millis(config.max_backoff_ms),
            current: initial,
            attempts: 0,
            budget: config.max_attempts,
        }
    }

    /// Record a failure and return the delay before the next attempt, or
    /// `None` when the retry budget is exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        self.attempts += 1;
        if let Some(budget) = self.budget {
            if self.attempts > budget {
                return None;
            }
        }

        let base = self.current;
        self.current = (self.current * 2).min(self.max);
        Some(with_jitter(base))
    }

    /// Reset after a successful connect.
    pub fn reset(&mut self) {
        self.current = self.initial;
        self.attempts = 0;
    }

    /// Consecutive failures since the last successful connect.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// Add up to 25% random jitter on top of the base delay.
fn with_jitter(base: Duration) -> Duration {
    let jitter_cap = base.as_millis() as u64 / 4;
    if jitter_cap == 0 {
        return base;
    }
    let jitter = rand::thread_rng().gen_range(0..=jitter_cap);
    base + Duration::from_millis(jitter)
}
