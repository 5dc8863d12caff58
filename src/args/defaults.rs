pub const DEFAULT_ON_TIME_LOG: &str = "time_differences.txt";
pub const DEFAULT_LATE_LOG: &str = "time_differences_faulty.txt";

pub(super) const DEFAULT_CONCURRENCY: &str = "70";
pub(super) const DEFAULT_MIN_DELAY: &str = "10ms";
pub(super) const DEFAULT_MAX_DELAY: &str = "50ms";
pub(super) const DEFAULT_THRESHOLD: &str = "1m";
pub(super) const DEFAULT_CHANNEL_CAPACITY: &str = "20";
pub(super) const DEFAULT_STORE_TTL: &str = "10m";
pub(super) const DEFAULT_SWEEP_INTERVAL: &str = "30s";
pub(super) const DEFAULT_RECONNECT_DELAY: &str = "5s";
pub(super) const DEFAULT_RECEIVE_TIMEOUT: &str = "30s";
pub(super) const DEFAULT_TRIGGER_TIMEOUT: &str = "30s";
