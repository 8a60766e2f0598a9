//! Queue resolution
//!
//! Maps a queue entry to the build it turns into once a worker picks it up.
//!
//! ```text
//! Submitted --(item has number + task URL)--> Assigned --(job + build found)--> Resolved
//!     ^                                           |
//!     +-------------(not found)-------------------+
//! ```
//!
//! The server creates queue items, jobs' build records and their indexes
//! asynchronously, so any lookup may briefly answer 404 for a record that
//! will exist moments later. Not-found is therefore always treated as "poll
//! again"; every other error ends resolution immediately. When the deadline
//! passes first, resolution is abandoned with a timeout.

use relay_client::{BuildServer, ClientError};
use relay_core::domain::build::BuildHandle;
use relay_core::domain::job::JobReference;
use relay_core::domain::queue::QueueEntry;
use tracing::{debug, info};

use crate::error::{Phase, Result, WatchError};
use crate::pacer::Pacer;

/// Where resolution currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueState {
    /// Waiting for a worker to pick the item up
    Submitted,
    /// The item names an execution; looking up its job and build
    Assigned { job: JobReference, number: u64 },
    /// The build exists
    Resolved(BuildHandle),
}

/// Resolution of one queue entry
#[derive(Debug)]
pub struct QueueResolution {
    entry: QueueEntry,
    state: QueueState,
    last_error: Option<String>,
}

impl QueueResolution {
    /// Start resolving `entry`
    ///
    /// A collapsed (zero) entry never turns into a build and is rejected.
    pub fn new(entry: QueueEntry) -> Result<Self> {
        if entry.is_collapsed() {
            return Err(WatchError::InvalidQueueEntry(entry));
        }

        Ok(Self {
            entry,
            state: QueueState::Submitted,
            last_error: None,
        })
    }

    pub fn entry(&self) -> QueueEntry {
        self.entry
    }

    pub fn state(&self) -> &QueueState {
        &self.state
    }

    /// The not-found error seen on the most recent poll, if any
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Poll on every tick of `pacer` until the build is found
    pub async fn run<S>(mut self, server: &S, pacer: &Pacer) -> Result<BuildHandle>
    where
        S: BuildServer + ?Sized,
    {
        loop {
            if let Err(interruption) = pacer.tick().await {
                return Err(interruption.into_error(Phase::Queued, self.last_error.take()));
            }

            if let Some(build) = self.poll(server).await? {
                return Ok(build);
            }
        }
    }

    /// Advance the state machine by one poll
    ///
    /// Returns the build once resolved, `None` when another poll is needed.
    pub async fn poll<S>(&mut self, server: &S) -> Result<Option<BuildHandle>>
    where
        S: BuildServer + ?Sized,
    {
        if let QueueState::Resolved(build) = &self.state {
            return Ok(Some(build.clone()));
        }

        let entry = self.entry;
        self.last_error = None;
        self.state = QueueState::Submitted;

        let item = match server.get_queue_item(entry).await {
            Ok(item) => item,
            Err(e) => {
                return self.not_found_or_fatal(e, || format!("Failed to get queue item {}", entry));
            }
        };

        if item.cancelled {
            return Err(WatchError::QueueItemCancelled(item.id));
        }

        let Some((number, task_url)) = item.assignment() else {
            debug!(
                "Queue item {} not picked up yet: {}",
                entry,
                item.why.as_deref().unwrap_or("no reason given")
            );
            return Ok(None);
        };

        let job = JobReference::from_task_url(task_url)?;
        self.state = QueueState::Assigned {
            job: job.clone(),
            number,
        };

        let handle = match server.get_job(&job).await {
            Ok(handle) => handle,
            Err(e) => return self.not_found_or_fatal(e, || format!("Failed to get job {}", job)),
        };

        let build = match server.get_build(&handle, number).await {
            Ok(build) => build,
            Err(e) => {
                return self.not_found_or_fatal(e, || {
                    format!("Failed to get build {} of job {}", number, job)
                });
            }
        };

        self.state = QueueState::Resolved(build.clone());
        Ok(Some(build))
    }

    /// Turn a not-found into another round of polling, anything else into a fatal error
    fn not_found_or_fatal(
        &mut self,
        error: ClientError,
        context: impl FnOnce() -> String,
    ) -> Result<Option<BuildHandle>> {
        if !error.is_not_found() {
            return Err(WatchError::remote(context(), error));
        }

        info!("Queue item {} not resolvable yet: {}", self.entry, error);
        self.state = QueueState::Submitted;
        self.last_error = Some(error.to_string());
        Ok(None)
    }
}
