//! Build lifecycle orchestrator
//!
//! Runs one build from start to verdict: attach to it (either an existing
//! build or a freshly triggered one), then follow it on every tick until it
//! stops running, streaming its console along the way. A single deadline
//! covers the whole run.

use std::collections::HashMap;

use relay_client::BuildServer;
use relay_core::domain::build::BuildHandle;
use relay_core::domain::job::JobReference;
use tokio::io::AsyncWrite;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::WatchConfig;
use crate::console::ConsoleReader;
use crate::error::{Phase, Result, WatchError};
use crate::pacer::{Deadline, Pacer};
use crate::poller::BuildPoller;
use crate::trigger::JobTrigger;

/// Destination for streamed console text
pub type OutputSink<'a> = &'a mut (dyn AsyncWrite + Unpin + Send);

/// Which build to follow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A build that already exists
    Existing { job: JobReference, number: u64 },
    /// Trigger a new build with the given parameters
    Trigger {
        job: JobReference,
        parameters: HashMap<String, String>,
    },
}

impl Target {
    pub fn job(&self) -> &JobReference {
        match self {
            Target::Existing { job, .. } | Target::Trigger { job, .. } => job,
        }
    }
}

/// Outcome of a build that finished successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub job: JobReference,
    pub number: u64,
    pub url: String,
    pub classification: Option<String>,
}

pub struct Orchestrator<'a, S: ?Sized> {
    server: &'a S,
    config: WatchConfig,
    cancel: CancellationToken,
}

impl<'a, S> Orchestrator<'a, S>
where
    S: BuildServer + ?Sized,
{
    pub fn new(server: &'a S, config: WatchConfig) -> Self {
        Self {
            server,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop waiting as soon as `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Attach to `target`, wait for it to finish and report the verdict
    ///
    /// Console text is written to `output` while the build runs; pass `None`
    /// to only follow its state. A build that finishes with anything other
    /// than the server's success classification yields
    /// [`WatchError::BuildFailed`].
    pub async fn run(
        &self,
        target: Target,
        output: Option<OutputSink<'_>>,
    ) -> Result<BuildReport> {
        self.config.validate()?;

        let pacer = Pacer::new(
            self.config.poll_interval,
            Deadline::after(self.config.wait_timeout),
            self.cancel.clone(),
        );

        let build = self.attach(target, &pacer).await?;
        let poller = self.wait(build, &pacer, output).await?;
        let snapshot = poller.snapshot();
        let build = poller.build();
        let classification = snapshot.classification().map(str::to_string);

        if !snapshot.is_success() {
            return Err(WatchError::BuildFailed {
                job: build.job.clone(),
                number: build.number,
                url: snapshot.url().to_string(),
                classification,
            });
        }

        Ok(BuildReport {
            job: build.job.clone(),
            number: build.number,
            url: snapshot.url().to_string(),
            classification,
        })
    }

    async fn attach(&self, target: Target, pacer: &Pacer) -> Result<BuildHandle> {
        match target {
            Target::Existing { job, number } => {
                let handle = self
                    .server
                    .get_job(&job)
                    .await
                    .map_err(|e| WatchError::remote(format!("Failed to get job {}", job), e))?;
                let build = self.server.get_build(&handle, number).await.map_err(|e| {
                    WatchError::remote(format!("Failed to get build {}", number), e)
                })?;

                info!("Job {} with build id {} is found", job, build.number);
                Ok(build)
            }
            Target::Trigger { job, parameters } => {
                JobTrigger::new(self.server, pacer, self.config.collapse_backoff)
                    .trigger(&job, &parameters)
                    .await
            }
        }
    }

    /// Follow `build` until the server reports it is no longer running
    async fn wait(
        &self,
        build: BuildHandle,
        pacer: &Pacer,
        mut output: Option<OutputSink<'_>>,
    ) -> Result<BuildPoller> {
        let mut console = ConsoleReader::new(self.config.retry);
        let mut poller = BuildPoller::new(build, self.config.retry);

        loop {
            if let Err(interruption) = pacer.tick().await {
                return Err(interruption.into_error(Phase::Running, None));
            }

            if let Some(sink) = output.as_mut() {
                console.drain(self.server, poller.build(), &mut **sink).await?;
            }

            if !poller.refresh(self.server).await?.is_running() {
                break;
            }
        }

        // Text logged between the last drain and the build finishing
        if let Some(sink) = output.as_mut() {
            console.drain(self.server, poller.build(), &mut **sink).await?;
        }

        debug!(
            "Build {} of job {} finished with {:?}",
            poller.build().number,
            poller.build().job,
            poller.snapshot().classification()
        );
        Ok(poller)
    }
}
