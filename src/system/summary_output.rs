use crate::metrics::{LatencySummary, RunSnapshot};

#[must_use]
pub fn summary_lines(snapshot: &RunSnapshot, latency: &LatencySummary) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push("Summary:".to_owned());
    lines.push(format!("dispatched: {}", snapshot.dispatched));
    lines.push(format!("trigger_failures: {}", snapshot.trigger_failures));
    lines.push(format!("received: {}", snapshot.received));
    lines.push(format!("decode_failures: {}", snapshot.decode_failures));
    lines.push(format!("ignored: {}", snapshot.ignored));
    lines.push(format!("misses: {}", snapshot.misses));
    lines.push(format!("on_time: {}", snapshot.on_time));
    lines.push(format!("late: {}", snapshot.late));
    lines.push(format!("write_failures: {}", snapshot.write_failures));
    lines.push(format!("evicted: {}", snapshot.evicted));
    lines.push(format!("failed_streams: {}", snapshot.failed_streams));
    lines.push(latency_line(latency));
    lines
}

fn latency_line(latency: &LatencySummary) -> String {
    if latency.count == 0 {
        return "latency_ms: none".to_owned();
    }
    format!(
        "latency_ms: count={} min={} p50={} p90={} p99={} max={}",
        latency.count,
        latency.min_ms,
        latency.p50_ms,
        latency.p90_ms,
        latency.p99_ms,
        latency.max_ms
    )
}
