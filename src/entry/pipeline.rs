use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::correlation::{
    CorrelationStore, Correlator, CorrelatorConfig, OutcomeLogs, spawn_store_sweeper,
};
use crate::dispatch::{DispatchConfig, DispatchLoop, Trigger, WorkCursor};
use crate::domain::{StreamDescriptor, WorkItem};
use crate::error::AppResult;
use crate::metrics::{LatencySummary, RunSnapshot, RunStats};
use crate::shutdown::{ShutdownSender, wait_for_shutdown};
use crate::streams::{FanIn, FanInConfig, StreamSource, spawn_fan_in};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub dispatch: DispatchConfig,
    pub correlator: CorrelatorConfig,
    pub fan_in: FanInConfig,
    pub on_time_log: PathBuf,
    pub late_log: PathBuf,
    pub store_ttl: Duration,
    pub sweep_interval: Duration,
}

/// The two remote systems the harness talks to.
pub struct Collaborators {
    pub trigger: Arc<dyn Trigger>,
    pub source: Arc<dyn StreamSource>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineReport {
    pub dispatched: u64,
    pub snapshot: RunSnapshot,
    pub latency: LatencySummary,
}

/// Runs dispatch, fan-in and correlation until `shutdown_tx` fires.
///
/// Dispatch stops first. Once every subscriber has stopped, the correlator
/// drains what is left in the merged buffer before the report is built. If
/// dispatch ends on its own (launch limit reached) the streams keep being
/// consumed until shutdown.
///
/// # Errors
///
/// Returns an error when the outcome logs cannot be created or a pipeline
/// task panicked.
pub async fn run_pipeline(
    settings: &PipelineSettings,
    work_items: Vec<WorkItem>,
    streams: Vec<StreamDescriptor>,
    collaborators: Collaborators,
    shutdown_tx: &ShutdownSender,
) -> AppResult<PipelineReport> {
    let mut shutdown_rx = shutdown_tx.subscribe();
    let logs = OutcomeLogs::create(&settings.on_time_log, &settings.late_log).await?;
    let store = Arc::new(CorrelationStore::new(settings.store_ttl));
    let stats = Arc::new(RunStats::new());

    let correlator = Correlator::new(
        settings.correlator.clone(),
        Arc::clone(&store),
        logs,
        Arc::clone(&stats),
    )?;
    let sweeper = spawn_store_sweeper(
        Arc::clone(&store),
        settings.sweep_interval,
        Arc::clone(&stats),
        shutdown_tx,
    );
    let FanIn {
        envelopes,
        subscribers,
    } = spawn_fan_in(
        collaborators.source,
        streams,
        settings.fan_in,
        Arc::clone(&stats),
        shutdown_tx,
    );
    let correlator_handle = correlator.spawn(envelopes);
    let dispatch_handle = DispatchLoop::new(
        settings.dispatch.clone(),
        WorkCursor::new(work_items),
        collaborators.trigger,
        Arc::clone(&store),
        Arc::clone(&stats),
    )
    .spawn(shutdown_tx);

    let dispatched = dispatch_handle.await?;
    if !wait_for_shutdown(&mut shutdown_rx).await {
        warn!("Shutdown channel closed before a shutdown was sent.");
    }
    info!("Shutting down, draining confirmation streams.");

    FanIn::join_subscribers(subscribers).await;
    let latency = correlator_handle.await?;
    sweeper.await?;

    Ok(PipelineReport {
        dispatched,
        snapshot: stats.snapshot(),
        latency,
    })
}
