//! Build domain types

use crate::domain::job::JobReference;

/// The classification label Jenkins gives a passing build
pub const SUCCESS_CLASSIFICATION: &str = "SUCCESS";

/// One concrete execution of a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildHandle {
    pub job: JobReference,
    pub number: u64,
    /// Absolute build URL, always ending in `/`
    pub url: String,
}

/// Remote status as returned by a single poll
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStatus {
    pub running: bool,
    /// Server classification (`SUCCESS`, `UNSTABLE`, `FAILURE`, ...), absent while running
    pub classification: Option<String>,
}

/// Outcome of a build as far as callers are concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildResult {
    Unknown,
    Success,
    Failure,
}

impl BuildResult {
    /// Map the server's classification onto a result
    ///
    /// Only the server's own success label counts as success; every other
    /// label, including `UNSTABLE`, is a failure.
    pub fn from_classification(classification: Option<&str>) -> Self {
        match classification {
            None | Some("") => BuildResult::Unknown,
            Some(SUCCESS_CLASSIFICATION) => BuildResult::Success,
            Some(_) => BuildResult::Failure,
        }
    }
}

/// Latest known state of a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSnapshot {
    running: bool,
    classification: Option<String>,
    url: String,
}

impl BuildSnapshot {
    /// Snapshot of a build that has not been polled yet
    pub fn pending(build: &BuildHandle) -> Self {
        Self {
            running: true,
            classification: None,
            url: build.url.clone(),
        }
    }

    /// Replace the snapshot with a freshly polled status
    pub fn update(&mut self, status: BuildStatus) {
        self.running = status.running;
        self.classification = status.classification;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The build result, `Unknown` for as long as the build is running
    pub fn result(&self) -> BuildResult {
        if self.running {
            return BuildResult::Unknown;
        }
        BuildResult::from_classification(self.classification.as_deref())
    }

    pub fn is_success(&self) -> bool {
        self.result() == BuildResult::Success
    }

    /// Raw server classification, when the build has finished
    pub fn classification(&self) -> Option<&str> {
        if self.running {
            return None;
        }
        self.classification.as_deref()
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}
