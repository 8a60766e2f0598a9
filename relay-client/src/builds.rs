//! Build-related API endpoints

use relay_core::domain::build::{BuildHandle, BuildStatus};
use relay_core::domain::console::ConsoleChunk;
use relay_core::domain::job::JobHandle;
use relay_core::dto::build::BuildInfo;
use reqwest::header::HeaderMap;

use crate::error::{ClientError, Result};
use crate::{JenkinsClient, with_trailing_slash};

const TEXT_SIZE_HEADER: &str = "x-text-size";
const MORE_DATA_HEADER: &str = "x-more-data";

impl JenkinsClient {
    // =============================================================================
    // Build Lookup & Status
    // =============================================================================

    /// Look up one execution of a job
    pub async fn get_build(&self, job: &JobHandle, number: u64) -> Result<BuildHandle> {
        let url = format!("{}{}/api/json", with_trailing_slash(&job.url), number);
        let response = self.get(&url).send().await?;
        let info: BuildInfo = self.handle_response(response).await?;

        Ok(BuildHandle {
            job: job.reference.clone(),
            number: info.number,
            url: with_trailing_slash(&info.url),
        })
    }

    /// Fetch the running flag and result classification of a build
    pub async fn poll_build_status(&self, build: &BuildHandle) -> Result<BuildStatus> {
        let url = format!("{}api/json", self.build_url(build)?);
        let response = self.get(&url).send().await?;
        let info: BuildInfo = self.handle_response(response).await?;

        Ok(info.into())
    }

    // =============================================================================
    // Console Output
    // =============================================================================

    /// Fetch console text starting at `offset`
    ///
    /// Jenkins reports the offset to continue from in `X-Text-Size` and sets
    /// `X-More-Data: true` while the log is still growing.
    pub async fn get_console_output(
        &self,
        build: &BuildHandle,
        offset: u64,
    ) -> Result<ConsoleChunk> {
        let url = format!("{}logText/progressiveText", self.build_url(build)?);
        let response = self
            .get(&url)
            .query(&[("start", offset)])
            .send()
            .await?;
        let response = self.check_status(response).await?;

        let headers = response.headers().clone();
        let text = response.text().await?;

        let next_offset = parse_text_size(&headers)?.unwrap_or(offset + text.len() as u64);
        let has_more = headers
            .get(MORE_DATA_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));

        Ok(ConsoleChunk {
            text,
            next_offset,
            has_more,
        })
    }

    /// API URL of a build, derived from the configured base URL
    ///
    /// The URL the server reports may use a different host name than the one
    /// we were configured with, so it is kept for display only.
    fn build_url(&self, build: &BuildHandle) -> Result<String> {
        Ok(format!("{}{}/", self.job_url(&build.job)?, build.number))
    }
}

fn parse_text_size(headers: &HeaderMap) -> Result<Option<u64>> {
    let Some(value) = headers.get(TEXT_SIZE_HEADER) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .map(Some)
        .ok_or_else(|| {
            ClientError::ParseError(format!("invalid {} header: {:?}", TEXT_SIZE_HEADER, value))
        })
}
