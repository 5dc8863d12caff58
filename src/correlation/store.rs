use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::debug;

use crate::metrics::RunStats;
use crate::shutdown::ShutdownSender;

/// Dispatch timestamps keyed by correlation key.
///
/// Written by the dispatch loop, read and cleared by the correlator. Entries
/// are removed on a successful match; anything older than `ttl` is dropped by
/// [`CorrelationStore::sweep`].
#[derive(Debug)]
pub struct CorrelationStore {
    entries: Mutex<HashMap<String, Instant>>,
    ttl: Duration,
}

impl CorrelationStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Instant>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records `dispatched_at` for `key`, returning the timestamp it replaced.
    #[must_use]
    pub fn record(&self, key: &str, dispatched_at: Instant) -> Option<Instant> {
        self.entries().insert(key.to_owned(), dispatched_at)
    }

    #[must_use]
    pub fn peek(&self, key: &str) -> Option<Instant> {
        self.entries().get(key).copied()
    }

    /// Removes and returns the dispatch timestamp for `key`.
    #[must_use]
    pub fn take(&self, key: &str) -> Option<Instant> {
        self.entries().remove(key)
    }

    /// Drops entries dispatched more than `ttl` before `now`.
    #[must_use]
    pub fn sweep(&self, now: Instant) -> usize {
        let ttl = self.ttl;
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, dispatched_at| now.saturating_duration_since(*dispatched_at) <= ttl);
        before.saturating_sub(entries.len())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[must_use]
pub fn spawn_store_sweeper(
    store: Arc<CorrelationStore>,
    sweep_interval: Duration,
    stats: Arc<RunStats>,
    shutdown_tx: &ShutdownSender,
) -> JoinHandle<()> {
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::spawn(async move {
        let mut ticker = interval(sweep_interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                _ = ticker.tick() => {
                    let evicted = store.sweep(Instant::now());
                    if evicted > 0 {
                        stats.record_evicted(evicted);
                        debug!(
                            "Evicted {} stale dispatch records ({} remaining).",
                            evicted,
                            store.len()
                        );
                    }
                }
            }
        }
    })
}
