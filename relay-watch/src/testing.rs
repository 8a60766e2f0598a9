//! Scripted build server for lifecycle tests
//!
//! Each operation pops its next response from a queue. Job and build lookups
//! fall back to a successful answer when nothing is scripted; the other
//! operations fail loudly so a test never silently runs past its script.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use relay_client::{BuildServer, ClientError, Result};
use relay_core::domain::build::{BuildHandle, BuildStatus};
use relay_core::domain::console::ConsoleChunk;
use relay_core::domain::job::{JobHandle, JobReference};
use relay_core::domain::queue::{QueueEntry, QueueItem};

pub const BASE_URL: &str = "http://ci.example.com";

/// A remote call as observed by the fake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    StartBuild(String),
    QueueItem(u64),
    Job(String),
    Build(String, u64),
    Status(u64),
    Console(u64),
}

#[derive(Default)]
pub struct ScriptedServer {
    start_build: Mutex<VecDeque<Result<QueueEntry>>>,
    queue_items: Mutex<VecDeque<Result<QueueItem>>>,
    jobs: Mutex<VecDeque<Result<JobHandle>>>,
    builds: Mutex<VecDeque<Result<BuildHandle>>>,
    statuses: Mutex<VecDeque<Result<BuildStatus>>>,
    console: Mutex<VecDeque<Result<ConsoleChunk>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_start_build(&self, response: Result<QueueEntry>) -> &Self {
        self.start_build.lock().unwrap().push_back(response);
        self
    }

    pub fn push_queue_item(&self, response: Result<QueueItem>) -> &Self {
        self.queue_items.lock().unwrap().push_back(response);
        self
    }

    pub fn push_job(&self, response: Result<JobHandle>) -> &Self {
        self.jobs.lock().unwrap().push_back(response);
        self
    }

    pub fn push_build(&self, response: Result<BuildHandle>) -> &Self {
        self.builds.lock().unwrap().push_back(response);
        self
    }

    pub fn push_status(&self, response: Result<BuildStatus>) -> &Self {
        self.statuses.lock().unwrap().push_back(response);
        self
    }

    pub fn push_console(&self, response: Result<ConsoleChunk>) -> &Self {
        self.console.lock().unwrap().push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Offsets requested from the console endpoint, in order
    pub fn console_offsets(&self) -> Vec<u64> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Console(offset) => Some(offset),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn exhausted(operation: &str) -> ClientError {
        ClientError::InvalidRequest(format!("no scripted response for {}", operation))
    }
}

#[async_trait]
impl BuildServer for ScriptedServer {
    async fn start_build(
        &self,
        job: &JobReference,
        _parameters: &HashMap<String, String>,
    ) -> Result<QueueEntry> {
        self.record(Call::StartBuild(job.to_string()));
        self.start_build
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::exhausted("start_build")))
    }

    async fn get_queue_item(&self, entry: QueueEntry) -> Result<QueueItem> {
        self.record(Call::QueueItem(entry.id));
        self.queue_items
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::exhausted("get_queue_item")))
    }

    async fn get_job(&self, job: &JobReference) -> Result<JobHandle> {
        self.record(Call::Job(job.to_string()));
        self.jobs
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(job_handle(job)))
    }

    async fn get_build(&self, job: &JobHandle, number: u64) -> Result<BuildHandle> {
        self.record(Call::Build(job.reference.to_string(), number));
        self.builds
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(build_handle(&job.reference, number)))
    }

    async fn poll_build_status(&self, build: &BuildHandle) -> Result<BuildStatus> {
        self.record(Call::Status(build.number));
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::exhausted("poll_build_status")))
    }

    async fn get_console_output(&self, _build: &BuildHandle, offset: u64) -> Result<ConsoleChunk> {
        self.record(Call::Console(offset));
        self.console
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(ConsoleChunk {
                    text: String::new(),
                    next_offset: offset,
                    has_more: false,
                })
            })
    }
}

pub fn job(name: &str) -> JobReference {
    JobReference::parse(name).unwrap()
}

pub fn job_handle(job: &JobReference) -> JobHandle {
    let path: String = job.segments().map(|s| format!("job/{}/", s)).collect();
    JobHandle {
        reference: job.clone(),
        url: format!("{}/{}", BASE_URL, path),
        in_queue: false,
        parameterized: false,
    }
}

pub fn build_handle(job: &JobReference, number: u64) -> BuildHandle {
    BuildHandle {
        job: job.clone(),
        number,
        url: format!("{}{}/", job_handle(job).url, number),
    }
}

pub fn queue_item(id: u64, number: u64, task_url: &str) -> QueueItem {
    QueueItem {
        id,
        execution_number: number,
        task_url: Some(task_url.to_string()),
        cancelled: false,
        why: None,
    }
}

pub fn status(running: bool, classification: Option<&str>) -> BuildStatus {
    BuildStatus {
        running,
        classification: classification.map(str::to_string),
    }
}

pub fn chunk(text: &str, next_offset: u64, has_more: bool) -> ConsoleChunk {
    ConsoleChunk {
        text: text.to_string(),
        next_offset,
        has_more,
    }
}

pub fn not_found(what: &str) -> ClientError {
    ClientError::NotFound(format!("{}/{}", BASE_URL, what))
}

pub fn server_error() -> ClientError {
    ClientError::api_error(500, "Internal Server Error")
}

/// Log sink for asserting on emitted events
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Route events at `level` and above to this sink on the current thread
    pub fn install(&self, level: tracing::Level) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(self.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
