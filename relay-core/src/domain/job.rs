//! Job domain types

use percent_encoding::percent_decode_str;
use thiserror::Error;

/// Marker that precedes every job segment in a Jenkins URL
const JOB_MARKER: &str = "/job/";

/// Errors produced while parsing a job reference
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobReferenceError {
    #[error("job name is empty")]
    Empty,

    #[error("no job path found in task URL '{0}'")]
    MissingJobPath(String),
}

/// Hierarchical job name: folder segments followed by the leaf job name
///
/// Immutable once parsed. Displays as `folder/sub/job`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobReference {
    folders: Vec<String>,
    name: String,
}

impl JobReference {
    /// Parse a user-supplied job name such as `my_folder/my_job`
    ///
    /// Empty segments (leading, trailing or doubled slashes) are ignored.
    pub fn parse(input: &str) -> Result<Self, JobReferenceError> {
        let segments = input
            .split('/')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Self::from_segments(segments)
    }

    /// Parse the owning job out of a queue item's task URL
    ///
    /// Every segment following a `/job/` marker names one level of the
    /// hierarchy, the last one being the leaf job:
    /// `https://ci/job/folder/job/myjob/` becomes `folder/myjob`.
    pub fn from_task_url(url: &str) -> Result<Self, JobReferenceError> {
        let start = url
            .find(JOB_MARKER)
            .ok_or_else(|| JobReferenceError::MissingJobPath(url.to_string()))?;

        let segments = url[start + JOB_MARKER.len()..]
            .trim_end_matches('/')
            .split(JOB_MARKER)
            .map(|s| {
                percent_decode_str(s.trim_matches('/'))
                    .decode_utf8_lossy()
                    .into_owned()
            })
            .filter(|s| !s.is_empty())
            .collect();

        Self::from_segments(segments)
            .map_err(|_| JobReferenceError::MissingJobPath(url.to_string()))
    }

    fn from_segments(mut segments: Vec<String>) -> Result<Self, JobReferenceError> {
        let name = segments.pop().ok_or(JobReferenceError::Empty)?;
        Ok(Self {
            folders: segments,
            name,
        })
    }

    /// Folder segments, outermost first
    pub fn folders(&self) -> &[String] {
        &self.folders
    }

    /// Leaf job name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All segments, folders first and the leaf name last
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.folders
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.name.as_str()))
    }
}

impl std::fmt::Display for JobReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for folder in &self.folders {
            write!(f, "{}/", folder)?;
        }
        write!(f, "{}", self.name)
    }
}

/// A job looked up on the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub reference: JobReference,
    /// Absolute job URL, always ending in `/`
    pub url: String,
    /// Whether the server already holds a queued invocation of this job
    pub in_queue: bool,
    /// Whether the job declares build parameters
    pub parameterized: bool,
}
