//! Build state poller
//!
//! Owns the [`BuildSnapshot`] of the build being watched and refreshes it
//! with one retried status fetch per call.

use relay_client::BuildServer;
use relay_core::domain::build::{BuildHandle, BuildSnapshot};
use relay_core::domain::retry::RetryBudget;

use crate::error::{Result, WatchError};
use crate::retry::retry;

const OPERATION: &str = "read build state";

#[derive(Debug, Clone)]
pub struct BuildPoller {
    build: BuildHandle,
    snapshot: BuildSnapshot,
    budget: RetryBudget,
}

impl BuildPoller {
    pub fn new(build: BuildHandle, budget: RetryBudget) -> Self {
        let snapshot = BuildSnapshot::pending(&build);
        Self {
            build,
            snapshot,
            budget,
        }
    }

    pub fn build(&self) -> &BuildHandle {
        &self.build
    }

    pub fn snapshot(&self) -> &BuildSnapshot {
        &self.snapshot
    }

    /// Poll the server once and replace the snapshot
    ///
    /// A build that finished with a failing result is a successful poll;
    /// only a status fetch that keeps failing is an error.
    pub async fn refresh<S>(&mut self, server: &S) -> Result<&BuildSnapshot>
    where
        S: BuildServer + ?Sized,
    {
        let build = &self.build;
        let status = retry(self.budget, OPERATION, move || server.poll_build_status(build))
            .await
            .map_err(|source| WatchError::RetriesExhausted {
                operation: OPERATION,
                attempts: self.budget.max_retries.saturating_add(1),
                source,
            })?;

        self.snapshot.update(status);
        Ok(&self.snapshot)
    }
}
