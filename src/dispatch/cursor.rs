use std::sync::Arc;

use crate::domain::WorkItem;

/// Round-robin position over the work set. Owned by the dispatch loop alone,
/// so advancing and wrapping happen in one step.
#[derive(Debug, Clone)]
pub struct WorkCursor {
    items: Vec<Arc<WorkItem>>,
    next: usize,
}

impl WorkCursor {
    #[must_use]
    pub fn new(items: Vec<WorkItem>) -> Self {
        Self {
            items: items.into_iter().map(Arc::new).collect(),
            next: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the current item and advances, wrapping to the first item
    /// after the last. `None` only for an empty work set.
    pub fn next_item(&mut self) -> Option<Arc<WorkItem>> {
        let item = self.items.get(self.next).cloned()?;
        let advanced = self.next.saturating_add(1);
        self.next = if advanced >= self.items.len() {
            0
        } else {
            advanced
        };
        Some(item)
    }
}
