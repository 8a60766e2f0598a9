//! Retry configuration

use std::time::Duration;

/// Attempt ceiling and fixed delay for retried remote calls
///
/// `max_retries` counts retries after the first attempt, so an operation runs
/// at most `max_retries + 1` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryBudget {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Budget with no delay between attempts
    pub fn immediate(max_retries: u32) -> Self {
        Self::new(max_retries, Duration::ZERO)
    }
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self {
            max_retries: 5,
            delay: Duration::from_millis(100),
        }
    }
}
