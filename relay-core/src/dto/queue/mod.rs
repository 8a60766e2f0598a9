//! Queue DTOs

use serde::{Deserialize, Serialize};

use crate::domain::queue::QueueItem;

/// Queue item document from `/queue/item/<id>/api/json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueItemInfo {
    pub id: u64,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default)]
    pub why: Option<String>,
    #[serde(default)]
    pub executable: Option<Executable>,
    #[serde(default)]
    pub task: Option<Task>,
}

/// The build a queue item turned into
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Executable {
    pub number: u64,
    #[serde(default)]
    pub url: Option<String>,
}

/// The job that owns a queue item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl From<QueueItemInfo> for QueueItem {
    fn from(info: QueueItemInfo) -> Self {
        QueueItem {
            id: info.id,
            execution_number: info.executable.map(|e| e.number).unwrap_or(0),
            task_url: info.task.and_then(|t| t.url),
            cancelled: info.cancelled,
            why: info.why,
        }
    }
}
