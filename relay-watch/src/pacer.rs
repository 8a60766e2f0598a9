//! Polling pacer
//!
//! Every wait in the lifecycle happens here: polling ticks, retry-free pauses
//! and the collapsed-submission backoff. Cancellation and the deadline are
//! checked only at these points, never in the middle of a remote call.

use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

use crate::error::{Phase, WatchError};

/// Absolute point in time after which waiting stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// Deadline `timeout` from now; `None` never expires
    pub fn after(timeout: Option<Duration>) -> Self {
        Self(timeout.and_then(|t| Instant::now().checked_add(t)))
    }

    pub fn never() -> Self {
        Self(None)
    }

    /// The instant the deadline expires at, if any
    pub fn instant(&self) -> Option<Instant> {
        self.0
    }

    pub fn is_expired(&self) -> bool {
        self.0.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// Why a wait stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interruption {
    TimedOut,
    Cancelled,
}

impl Interruption {
    pub fn into_error(self, phase: Phase, last_error: Option<String>) -> WatchError {
        match self {
            Interruption::TimedOut => WatchError::Timeout { phase, last_error },
            Interruption::Cancelled => WatchError::Cancelled { phase },
        }
    }
}

/// Fixed-interval ticker bound to a deadline and a cancellation token
#[derive(Debug, Clone)]
pub struct Pacer {
    interval: Duration,
    deadline: Deadline,
    cancel: CancellationToken,
}

impl Pacer {
    pub fn new(interval: Duration, deadline: Deadline, cancel: CancellationToken) -> Self {
        Self {
            interval,
            deadline,
            cancel,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait one polling interval, then report whether to keep going
    pub async fn tick(&self) -> Result<(), Interruption> {
        self.pause(self.interval).await
    }

    /// Wait `duration`, then check cancellation and the deadline
    ///
    /// Wakes early when the token is cancelled or the deadline falls inside
    /// the wait.
    pub async fn pause(&self, duration: Duration) -> Result<(), Interruption> {
        let wake = match (Instant::now().checked_add(duration), self.deadline.instant()) {
            (Some(end), Some(deadline)) => Some(end.min(deadline)),
            (end, deadline) => end.or(deadline),
        };

        tokio::select! {
            _ = self.cancel.cancelled() => return Err(Interruption::Cancelled),
            _ = async {
                match wake {
                    Some(instant) => sleep_until(instant).await,
                    None => std::future::pending().await,
                }
            } => {}
        }
        self.check()
    }

    /// Check cancellation and the deadline without waiting
    pub fn check(&self) -> Result<(), Interruption> {
        if self.cancel.is_cancelled() {
            return Err(Interruption::Cancelled);
        }
        if self.deadline.is_expired() {
            return Err(Interruption::TimedOut);
        }
        Ok(())
    }
}
