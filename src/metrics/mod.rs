//! Run counters and latency aggregation.
mod histogram;
mod stats;


pub use histogram::{LatencyHistogram, LatencySummary};
pub use stats::{RunSnapshot, RunStats};
