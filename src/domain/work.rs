/// One entry of the cyclic work set. Loaded once at startup, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub target_id: String,
    pub group_id: String,
    pub operation_id: String,
    pub variant: String,
}

impl WorkItem {
    #[must_use]
    pub const fn new(
        target_id: String,
        group_id: String,
        operation_id: String,
        variant: String,
    ) -> Self {
        Self {
            target_id,
            group_id,
            operation_id,
            variant,
        }
    }

    /// Key under which the dispatch time is recorded and later matched
    /// against confirmation events.
    #[must_use]
    pub fn correlation_key(&self) -> &str {
        &self.operation_id
    }
}
