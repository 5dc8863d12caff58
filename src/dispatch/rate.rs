use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::interval;

use crate::shutdown::ShutdownSender;

/// Builds a token bucket holding at most `rate` launch tokens, refilled once
/// per second. Returns `None` when launches are not rate capped.
#[must_use]
pub fn build_launch_limiter(
    rate: Option<u64>,
    shutdown_tx: &ShutdownSender,
) -> Option<Arc<Semaphore>> {
    let rate = rate.filter(|rate| *rate > 0)?;
    let limiter = Arc::new(Semaphore::new(0));
    spawn_fixed_rate_controller(Arc::clone(&limiter), rate, shutdown_tx);
    Some(limiter)
}

fn spawn_fixed_rate_controller(limiter: Arc<Semaphore>, rate: u64, shutdown_tx: &ShutdownSender) {
    let mut shutdown_rx = shutdown_tx.subscribe();
    let rate_per_sec = usize::try_from(rate)
        .unwrap_or(usize::MAX)
        .min(Semaphore::MAX_PERMITS);
    limiter.add_permits(rate_per_sec);
    tokio::spawn(async move {
        let mut rate_tick = interval(Duration::from_secs(1));
        rate_tick.tick().await;
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    limiter.close();
                    break;
                }
                _ = rate_tick.tick() => {
                    let available = limiter.available_permits();
                    if available < rate_per_sec {
                        limiter.add_permits(rate_per_sec.saturating_sub(available));
                    }
                }
            }
        }
    });
}
