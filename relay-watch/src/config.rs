//! Watch configuration
//!
//! Timing knobs for triggering and following a build. Retry parameters are
//! part of the configuration so tests can run without delays.

use std::time::Duration;

use relay_core::domain::retry::RetryBudget;

use crate::error::{Result, WatchError};

/// Lifecycle configuration
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// How often the queue and the build are polled
    pub poll_interval: Duration,

    /// Deadline shared by the trigger and wait phases; `None` waits forever
    pub wait_timeout: Option<Duration>,

    /// Attempt ceiling and delay for retried status and log calls
    pub retry: RetryBudget,

    /// Pause before resubmitting a collapsed submission
    pub collapse_backoff: Duration,
}

impl WatchConfig {
    /// Creates a new configuration with defaults
    pub fn new() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            wait_timeout: None,
            retry: RetryBudget::default(),
            collapse_backoff: Duration::from_secs(1),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_wait_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryBudget) -> Self {
        self.retry = retry;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(WatchError::Config(
                "poll_interval must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self::new()
    }
}
