use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by every stage of a run.
#[derive(Debug, Default)]
pub struct RunStats {
    dispatched: AtomicU64,
    trigger_failures: AtomicU64,
    received: AtomicU64,
    decode_failures: AtomicU64,
    ignored: AtomicU64,
    misses: AtomicU64,
    on_time: AtomicU64,
    late: AtomicU64,
    write_failures: AtomicU64,
    evicted: AtomicU64,
    failed_streams: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSnapshot {
    pub dispatched: u64,
    pub trigger_failures: u64,
    pub received: u64,
    pub decode_failures: u64,
    pub ignored: u64,
    pub misses: u64,
    pub on_time: u64,
    pub late: u64,
    pub write_failures: u64,
    pub evicted: u64,
    pub failed_streams: u64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl RunStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_dispatch(&self) {
        bump(&self.dispatched);
    }

    pub fn record_trigger_failure(&self) {
        bump(&self.trigger_failures);
    }

    pub fn record_received(&self) {
        bump(&self.received);
    }

    pub fn record_decode_failure(&self) {
        bump(&self.decode_failures);
    }

    pub fn record_ignored(&self) {
        bump(&self.ignored);
    }

    pub fn record_miss(&self) {
        bump(&self.misses);
    }

    pub fn record_on_time(&self) {
        bump(&self.on_time);
    }

    pub fn record_late(&self) {
        bump(&self.late);
    }

    pub fn record_write_failure(&self) {
        bump(&self.write_failures);
    }

    pub fn record_evicted(&self, count: usize) {
        let count = u64::try_from(count).unwrap_or(u64::MAX);
        self.evicted.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_failed_stream(&self) {
        bump(&self.failed_streams);
    }

    #[must_use]
    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            trigger_failures: self.trigger_failures.load(Ordering::Relaxed),
            received: self.received.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            on_time: self.on_time.load(Ordering::Relaxed),
            late: self.late.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            failed_streams: self.failed_streams.load(Ordering::Relaxed),
        }
    }
}
