//! Job-related API endpoints

use std::collections::HashMap;

use relay_core::domain::job::{JobHandle, JobReference};
use relay_core::domain::queue::QueueEntry;
use relay_core::dto::job::JobInfo;
use reqwest::header::LOCATION;
use tracing::{debug, info};

use crate::JenkinsClient;
use crate::error::{ClientError, Result};

impl JenkinsClient {
    // =============================================================================
    // Job Lookup
    // =============================================================================

    /// Look up a job by its hierarchical name
    ///
    /// # Returns
    /// The job handle, or [`ClientError::NotFound`] when no such job exists
    pub async fn get_job(&self, job: &JobReference) -> Result<JobHandle> {
        let url = self.job_url(job)?;
        let response = self.get(&format!("{}api/json", url)).send().await?;
        let info: JobInfo = self.handle_response(response).await?;

        Ok(JobHandle {
            reference: job.clone(),
            url,
            in_queue: info.in_queue,
            parameterized: info.is_parameterized(),
        })
    }

    // =============================================================================
    // Build Submission
    // =============================================================================

    /// Submit a build of a job
    ///
    /// Jobs that declare parameters, or are given some, are started through
    /// `buildWithParameters` with the parameters form-encoded; parameterless
    /// jobs go through `build`. A parameterized job started without values
    /// runs with its defaults.
    ///
    /// # Returns
    /// The queue entry taken from the `Location` header. The entry is 0 when
    /// the job already sits in the queue: Jenkins folds identical requests
    /// into the queued one, so the submission produced nothing to follow.
    pub async fn start_build(
        &self,
        job: &JobReference,
        parameters: &HashMap<String, String>,
    ) -> Result<QueueEntry> {
        let handle = self.get_job(job).await?;
        if handle.in_queue {
            debug!("Job {} is already queued, submission collapsed", job);
            return Ok(QueueEntry::new(0));
        }

        let endpoint = if handle.parameterized || !parameters.is_empty() {
            "buildWithParameters"
        } else {
            "build"
        };
        let url = format!("{}{}", handle.url, endpoint);

        let mut request = self.post(&url).await?;
        if !parameters.is_empty() {
            request = request.form(parameters);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        let queue_id = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(queue_id_from_location)
            .unwrap_or(0);

        info!("Submitted build of {} (queue item {})", job, queue_id);
        Ok(QueueEntry::new(queue_id))
    }
}

/// Extract the queue item id from a `.../queue/item/<id>/` location
///
/// Anything else yields 0.
fn queue_id_from_location(location: &str) -> u64 {
    let Some(start) = location.find("/queue/item/") else {
        return 0;
    };

    location[start + "/queue/item/".len()..]
        .trim_end_matches('/')
        .parse()
        .unwrap_or(0)
}
