use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, sleep};
use tracing::{debug, error, info, warn};

use crate::correlation::CorrelationStore;
use crate::metrics::RunStats;
use crate::shutdown::{ShutdownReceiver, ShutdownSender};

use super::cursor::WorkCursor;
use super::jitter::JitterRange;
use super::rate::build_launch_limiter;
use super::trigger::Trigger;

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Maximum number of trigger calls in flight.
    pub concurrency: usize,
    pub jitter: JitterRange,
    /// Optional cap on launches per second.
    pub rate: Option<u64>,
    /// Stop after this many launches; `None` runs until shutdown.
    pub max_dispatches: Option<u64>,
}

pub struct DispatchLoop {
    config: DispatchConfig,
    cursor: WorkCursor,
    trigger: Arc<dyn Trigger>,
    store: Arc<CorrelationStore>,
    stats: Arc<RunStats>,
}

impl DispatchLoop {
    #[must_use]
    pub const fn new(
        config: DispatchConfig,
        cursor: WorkCursor,
        trigger: Arc<dyn Trigger>,
        store: Arc<CorrelationStore>,
        stats: Arc<RunStats>,
    ) -> Self {
        Self {
            config,
            cursor,
            trigger,
            store,
            stats,
        }
    }

    /// Spawns the loop. The shutdown receiver is taken before spawning so a
    /// signal sent right after this call is not lost. The task resolves to
    /// the number of launches once every in-flight call has finished.
    #[must_use]
    pub fn spawn(self, shutdown_tx: &ShutdownSender) -> JoinHandle<u64> {
        let shutdown_rx = shutdown_tx.subscribe();
        let shutdown_tx = shutdown_tx.clone();
        tokio::spawn(async move { self.run(&shutdown_tx, shutdown_rx).await })
    }

    pub async fn run(mut self, shutdown_tx: &ShutdownSender, mut shutdown_rx: ShutdownReceiver) -> u64 {
        let slots = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let launch_limiter = build_launch_limiter(self.config.rate, shutdown_tx);
        let mut rng = StdRng::from_entropy();
        let mut in_flight = JoinSet::new();
        let mut dispatched: u64 = 0;

        info!(
            "Dispatching {} work items with concurrency {}.",
            self.cursor.len(),
            self.config.concurrency
        );

        loop {
            if let Some(limit) = self.config.max_dispatches
                && dispatched >= limit
            {
                debug!("Dispatch limit of {} reached.", limit);
                break;
            }

            let permit_result = tokio::select! {
                _ = shutdown_rx.recv() => break,
                permit = Arc::clone(&slots).acquire_owned() => permit,
            };
            let permit = match permit_result {
                Ok(permit) => permit,
                Err(_) => break,
            };

            if let Some(limiter) = launch_limiter.as_ref() {
                let token_result = tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    token = limiter.acquire() => token,
                };
                match token_result {
                    Ok(token) => token.forget(),
                    Err(_) => break,
                }
            }

            let Some(item) = self.cursor.next_item() else {
                warn!("Work set is empty, nothing to dispatch.");
                break;
            };

            // Recorded before the call starts so a fast confirmation still finds it.
            if self
                .store
                .record(item.correlation_key(), Instant::now())
                .is_some()
            {
                debug!(
                    "Re-dispatch of {} replaced an unconfirmed timestamp.",
                    item.correlation_key()
                );
            }
            self.stats.record_dispatch();
            dispatched = dispatched.saturating_add(1);

            let trigger = Arc::clone(&self.trigger);
            let stats = Arc::clone(&self.stats);
            in_flight.spawn(async move {
                let _permit = permit;
                if let Err(err) = trigger.trigger(&item).await {
                    stats.record_trigger_failure();
                    warn!(
                        "Trigger for {} ({}/{}) failed: {}",
                        item.correlation_key(),
                        item.target_id,
                        item.group_id,
                        err
                    );
                }
            });
            reap_finished(&mut in_flight);

            let delay = self.config.jitter.sample(&mut rng);
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                () = sleep(delay) => {}
            }
        }

        debug!("Waiting for {} in-flight trigger calls.", in_flight.len());
        while let Some(result) = in_flight.join_next().await {
            log_join_result(result);
        }
        info!("Dispatch loop stopped after {} launches.", dispatched);
        dispatched
    }
}

fn reap_finished(in_flight: &mut JoinSet<()>) {
    while let Some(result) = in_flight.try_join_next() {
        log_join_result(result);
    }
}

fn log_join_result(result: Result<(), tokio::task::JoinError>) {
    if let Err(err) = result {
        error!("Dispatch task failed: {}", err);
    }
}
