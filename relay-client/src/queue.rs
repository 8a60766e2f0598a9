//! Queue-related API endpoints

use relay_core::domain::queue::{QueueEntry, QueueItem};
use relay_core::dto::queue::QueueItemInfo;

use crate::JenkinsClient;
use crate::error::Result;

impl JenkinsClient {
    /// Fetch the current state of a queue item
    ///
    /// Freshly created items can be missing for a moment, and items that
    /// left the queue long ago are purged; both come back as
    /// [`crate::ClientError::NotFound`].
    pub async fn get_queue_item(&self, entry: QueueEntry) -> Result<QueueItem> {
        let url = format!("{}/queue/item/{}/api/json", self.base_url, entry.id);
        let response = self.get(&url).send().await?;
        let info: QueueItemInfo = self.handle_response(response).await?;

        Ok(info.into())
    }
}
