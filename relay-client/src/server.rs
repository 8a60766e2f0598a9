//! Build server capability
//!
//! The lifecycle only needs six remote operations. They are collected in the
//! [`BuildServer`] trait so the wait logic can run against any implementation,
//! including scripted fakes in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use relay_core::domain::build::{BuildHandle, BuildStatus};
use relay_core::domain::console::ConsoleChunk;
use relay_core::domain::job::{JobHandle, JobReference};
use relay_core::domain::queue::{QueueEntry, QueueItem};

use crate::JenkinsClient;
use crate::error::Result;

/// Remote operations needed to trigger and follow a build
///
/// Lookups that can race with the server's own bookkeeping (queue items,
/// jobs, builds) report a missing record as [`crate::ClientError::NotFound`].
#[async_trait]
pub trait BuildServer: Send + Sync {
    /// Submit a build; a zero entry means the submission was collapsed
    async fn start_build(
        &self,
        job: &JobReference,
        parameters: &HashMap<String, String>,
    ) -> Result<QueueEntry>;

    /// Fetch the current state of a queue item
    async fn get_queue_item(&self, entry: QueueEntry) -> Result<QueueItem>;

    /// Look up a job by name
    async fn get_job(&self, job: &JobReference) -> Result<JobHandle>;

    /// Look up one execution of a job
    async fn get_build(&self, job: &JobHandle, number: u64) -> Result<BuildHandle>;

    /// Fetch a build's running flag and result classification
    async fn poll_build_status(&self, build: &BuildHandle) -> Result<BuildStatus>;

    /// Fetch console text starting at `offset`
    async fn get_console_output(&self, build: &BuildHandle, offset: u64) -> Result<ConsoleChunk>;
}

#[async_trait]
impl BuildServer for JenkinsClient {
    async fn start_build(
        &self,
        job: &JobReference,
        parameters: &HashMap<String, String>,
    ) -> Result<QueueEntry> {
        JenkinsClient::start_build(self, job, parameters).await
    }

    async fn get_queue_item(&self, entry: QueueEntry) -> Result<QueueItem> {
        JenkinsClient::get_queue_item(self, entry).await
    }

    async fn get_job(&self, job: &JobReference) -> Result<JobHandle> {
        JenkinsClient::get_job(self, job).await
    }

    async fn get_build(&self, job: &JobHandle, number: u64) -> Result<BuildHandle> {
        JenkinsClient::get_build(self, job, number).await
    }

    async fn poll_build_status(&self, build: &BuildHandle) -> Result<BuildStatus> {
        JenkinsClient::poll_build_status(self, build).await
    }

    async fn get_console_output(&self, build: &BuildHandle, offset: u64) -> Result<ConsoleChunk> {
        JenkinsClient::get_console_output(self, build, offset).await
    }
}
