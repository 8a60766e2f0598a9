//! Queue domain types

/// Receipt for a submitted build request
///
/// An identifier of 0 means the server folded the submission into an
/// invocation that was already queued; such an entry never resolves to a
/// build and has to be submitted again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueEntry {
    pub id: u64,
}

impl QueueEntry {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    /// Whether the submission was collapsed into an existing queue item
    pub fn is_collapsed(&self) -> bool {
        self.id == 0
    }
}

impl std::fmt::Display for QueueEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// One observation of a queue item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueItem {
    pub id: u64,
    /// Execution number, 0 until a worker picks the item up
    pub execution_number: u64,
    /// URL of the job that owns the item
    pub task_url: Option<String>,
    pub cancelled: bool,
    /// Server explanation for why the item is still waiting
    pub why: Option<String>,
}

impl QueueItem {
    /// The execution number and owning job URL, once both are known
    pub fn assignment(&self) -> Option<(u64, &str)> {
        match (self.execution_number, self.task_url.as_deref()) {
            (0, _) | (_, None) | (_, Some("")) => None,
            (number, Some(url)) => Some((number, url)),
        }
    }
}
