//! Error types for the build lifecycle

use relay_client::ClientError;
use relay_core::domain::job::{JobReference, JobReferenceError};
use relay_core::domain::queue::QueueEntry;
use thiserror::Error;

/// Result type alias for lifecycle operations
pub type Result<T> = std::result::Result<T, WatchError>;

/// Stage of the lifecycle an interruption happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Submitting the job
    Triggering,
    /// Waiting for a queued submission to turn into a build
    Queued,
    /// Waiting for a running build to finish
    Running,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Triggering => write!(f, "triggering the job"),
            Phase::Queued => write!(f, "waiting for the build to be picked up"),
            Phase::Running => write!(f, "waiting for build results"),
        }
    }
}

/// The three outcomes a caller has to tell apart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The deadline elapsed
    Timeout,
    /// The build finished without being classified as successful
    BuildFailure,
    /// Anything else: bad configuration, remote errors, cancellation
    Fatal,
}

/// Errors produced while triggering or watching a build
#[derive(Debug, Error)]
pub enum WatchError {
    /// Configuration rejected before any remote call
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Job parameters are not a flat JSON object
    #[error("Failed to parse job parameters: {0}")]
    InvalidParameters(String),

    /// A collapsed (zero) queue entry was handed to queue resolution
    #[error("Queue entry {0} does not identify a queue item")]
    InvalidQueueEntry(QueueEntry),

    /// The queue item was cancelled on the server and will never start
    #[error("Queue item {0} was cancelled")]
    QueueItemCancelled(u64),

    /// The owning job could not be read from a queue item's task URL
    #[error("Failed to determine job from queue item: {0}")]
    InvalidTaskUrl(#[from] JobReferenceError),

    /// A retried remote call kept failing
    #[error("Failed to {operation} after {attempts} attempt(s): {source}")]
    RetriesExhausted {
        operation: &'static str,
        attempts: u32,
        #[source]
        source: ClientError,
    },

    /// A remote call failed in a way that is not retried
    #[error("{context}: {source}")]
    Remote {
        context: String,
        #[source]
        source: ClientError,
    },

    /// Console text could not be written to the output sink
    #[error("Failed to write console output: {0}")]
    Output(#[from] std::io::Error),

    /// The shared deadline elapsed
    #[error("Reached timeout while {phase}{}", describe_last_error(.last_error))]
    Timeout {
        phase: Phase,
        last_error: Option<String>,
    },

    /// The wait was cancelled
    #[error("Cancelled while {phase}")]
    Cancelled { phase: Phase },

    /// The build finished and the server did not classify it as successful
    #[error("Job {job} failed{}, URL: {url}", describe_classification(.classification))]
    BuildFailed {
        job: JobReference,
        number: u64,
        url: String,
        classification: Option<String>,
    },
}

impl WatchError {
    /// Wrap a non-retried remote failure with what was being attempted
    pub fn remote(context: impl Into<String>, source: ClientError) -> Self {
        Self::Remote {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::BuildFailed { .. } => ErrorKind::BuildFailure,
            _ => ErrorKind::Fatal,
        }
    }
}

fn describe_last_error(last_error: &Option<String>) -> String {
    match last_error {
        Some(e) => format!(", last error: {}", e),
        None => String::new(),
    }
}

fn describe_classification(classification: &Option<String>) -> String {
    match classification {
        Some(c) => format!(" ({})", c),
        None => String::new(),
    }
}
