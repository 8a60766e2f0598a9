//! Job trigger
//!
//! Submits a job and follows the submission until it becomes a build.
//!
//! Jenkins folds a request for a job that already has an identical item in
//! the queue into that item and reports no new queue entry (id 0). Rather
//! than fail, or attach to somebody else's request, the trigger waits a
//! moment and submits again until it gets an entry of its own. That quirk
//! is handled here and nowhere else.

use std::collections::HashMap;
use std::time::Duration;

use relay_client::BuildServer;
use relay_core::domain::build::BuildHandle;
use relay_core::domain::job::JobReference;
use serde_json::Value;
use tracing::info;

use crate::error::{Phase, Result, WatchError};
use crate::pacer::Pacer;
use crate::queue::QueueResolution;

/// Parse job parameters from a JSON object
///
/// An empty or blank string means no parameters. Values must be strings,
/// numbers or booleans; the latter two are passed on in their JSON spelling.
pub fn parse_parameters(json: &str) -> Result<HashMap<String, String>> {
    if json.trim().is_empty() {
        return Ok(HashMap::new());
    }

    let object: serde_json::Map<String, Value> =
        serde_json::from_str(json).map_err(|e| WatchError::InvalidParameters(e.to_string()))?;

    object
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => Ok((key, s)),
            Value::Number(n) => Ok((key, n.to_string())),
            Value::Bool(b) => Ok((key, b.to_string())),
            other => Err(WatchError::InvalidParameters(format!(
                "parameter '{}' must be a string, number or boolean, got {}",
                key, other
            ))),
        })
        .collect()
}

/// Submits a job and waits for the resulting build to exist
pub struct JobTrigger<'a, S: ?Sized> {
    server: &'a S,
    pacer: &'a Pacer,
    collapse_backoff: Duration,
}

impl<'a, S> JobTrigger<'a, S>
where
    S: BuildServer + ?Sized,
{
    pub fn new(server: &'a S, pacer: &'a Pacer, collapse_backoff: Duration) -> Self {
        Self {
            server,
            pacer,
            collapse_backoff,
        }
    }

    /// Submit `job` and return the build it turns into
    ///
    /// The first submission always goes out; the deadline and cancellation
    /// are checked before each resubmission and on every queue poll.
    pub async fn trigger(
        &self,
        job: &JobReference,
        parameters: &HashMap<String, String>,
    ) -> Result<BuildHandle> {
        loop {
            let entry = self
                .server
                .start_build(job, parameters)
                .await
                .map_err(|e| WatchError::remote(format!("Failed to invoke job {}", job), e))?;

            if entry.is_collapsed() {
                info!(
                    "Job {} is already queued, submitting again in {:?}",
                    job, self.collapse_backoff
                );
                if let Err(interruption) = self.pacer.pause(self.collapse_backoff).await {
                    return Err(interruption.into_error(Phase::Triggering, None));
                }
                continue;
            }

            info!(
                "Job {} is queued with id {}, waiting for a worker to pick it up",
                job, entry
            );
            let build = QueueResolution::new(entry)?
                .run(self.server, self.pacer)
                .await?;

            info!("Job {} is running with build id {}", job, build.number);
            return Ok(build);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacer::Deadline;
    use crate::testing::*;
    use relay_core::domain::queue::QueueEntry;
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    const TASK_URL: &str = "http://ci.example.com/job/folder/job/myjob/";

    fn pacer(timeout: Option<Duration>) -> Pacer {
        Pacer::new(
            Duration::from_millis(500),
            Deadline::after(timeout),
            CancellationToken::new(),
        )
    }

    #[test]
    fn test_parse_parameters_empty() {
        assert!(parse_parameters("").unwrap().is_empty());
        assert!(parse_parameters("  ").unwrap().is_empty());
        assert!(parse_parameters("{}").unwrap().is_empty());
    }

    #[test]
    fn test_parse_parameters_flat_object() {
        let params =
            parse_parameters(r#"{"BRANCH": "main", "RETRIES": 3, "DRY_RUN": true}"#).unwrap();

        assert_eq!(params.len(), 3);
        assert_eq!(params["BRANCH"], "main");
        assert_eq!(params["RETRIES"], "3");
        assert_eq!(params["DRY_RUN"], "true");
    }

    #[test]
    fn test_parse_parameters_rejects_invalid_input() {
        assert!(matches!(
            parse_parameters("not json"),
            Err(WatchError::InvalidParameters(_))
        ));
        assert!(matches!(
            parse_parameters(r#"["a", "b"]"#),
            Err(WatchError::InvalidParameters(_))
        ));
        assert!(matches!(
            parse_parameters(r#"{"nested": {"a": 1}}"#),
            Err(WatchError::InvalidParameters(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_resolves_queue_entry() {
        let server = ScriptedServer::new();
        server
            .push_start_build(Ok(QueueEntry::new(42)))
            .push_queue_item(Ok(queue_item(42, 7, TASK_URL)));
        let pacer = pacer(None);
        let trigger = JobTrigger::new(&server, &pacer, Duration::from_secs(1));

        let build = trigger
            .trigger(&job("folder/myjob"), &HashMap::new())
            .await
            .unwrap();

        assert_eq!(build.number, 7);
        assert_eq!(server.calls()[0], Call::StartBuild("folder/myjob".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_collapsed_submission_is_resubmitted() {
        let server = ScriptedServer::new();
        server
            .push_start_build(Ok(QueueEntry::new(0)))
            .push_start_build(Ok(QueueEntry::new(0)))
            .push_start_build(Ok(QueueEntry::new(42)))
            .push_queue_item(Ok(queue_item(42, 7, TASK_URL)));
        let pacer = pacer(None);
        let trigger = JobTrigger::new(&server, &pacer, Duration::from_secs(1));

        let start = Instant::now();
        let build = trigger
            .trigger(&job("folder/myjob"), &HashMap::new())
            .await
            .unwrap();

        assert_eq!(build.number, 7);
        // two backoffs plus one queue poll
        assert_eq!(start.elapsed(), Duration::from_millis(2500));
        let submissions = server
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::StartBuild(_)))
            .count();
        assert_eq!(submissions, 3);
        assert!(!server.calls().contains(&Call::QueueItem(0)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_collapsed_submissions_stop_at_deadline() {
        let server = ScriptedServer::new();
        for _ in 0..10 {
            server.push_start_build(Ok(QueueEntry::new(0)));
        }
        let pacer = pacer(Some(Duration::from_millis(2500)));
        let trigger = JobTrigger::new(&server, &pacer, Duration::from_secs(1));

        let start = Instant::now();
        let err = trigger
            .trigger(&job("folder/myjob"), &HashMap::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WatchError::Timeout {
                phase: Phase::Triggering,
                ..
            }
        ));
        assert_eq!(server.calls().len(), 3);
        // the third backoff is cut short by the deadline
        assert_eq!(start.elapsed(), Duration::from_millis(2500));
    }

    #[tokio::test]
    async fn test_submission_error_is_fatal() {
        let server = ScriptedServer::new();
        server.push_start_build(Err(server_error()));
        let pacer = pacer(None);
        let trigger = JobTrigger::new(&server, &pacer, Duration::from_secs(1));

        let err = trigger
            .trigger(&job("folder/myjob"), &HashMap::new())
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("Failed to invoke job folder/myjob"));
        assert_eq!(server.calls().len(), 1);
    }
}
