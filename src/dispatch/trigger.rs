use async_trait::async_trait;

use crate::domain::WorkItem;
use crate::error::TriggerError;

/// Starts the remote operation for one work item. Completion is observed
/// later through a confirmation stream, not through this call.
#[async_trait]
pub trait Trigger: Send + Sync {
    async fn trigger(&self, item: &WorkItem) -> Result<(), TriggerError>;
}
