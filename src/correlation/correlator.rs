use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, warn};

use crate::domain::InboundEnvelope;
use crate::error::{AppError, AppResult, DecodeError};
use crate::metrics::{LatencyHistogram, LatencySummary, RunStats};

use super::classify::{Bucket, ClassificationResult, DEFAULT_LATE_THRESHOLD};
use super::event::{ConfirmationEvent, decode_confirmation};
use super::outcome::OutcomeLogs;
use super::store::CorrelationStore;

/// Event kind emitted once a dispatched operation is live.
pub const DEFAULT_CONFIRMATION_KIND: &str = "DEPLOY_API_IN_GATEWAY";

#[derive(Debug, Clone)]
pub struct CorrelatorConfig {
    pub confirmation_kind: String,
    pub late_threshold: Duration,
}

impl Default for CorrelatorConfig {
    fn default() -> Self {
        Self {
            confirmation_kind: DEFAULT_CONFIRMATION_KIND.to_owned(),
            late_threshold: DEFAULT_LATE_THRESHOLD,
        }
    }
}

/// What happened to a single envelope.
#[derive(Debug)]
pub enum CorrelationOutcome {
    Classified(ClassificationResult),
    /// Matched and classified, but the outcome line could not be written.
    /// Not counted as on-time or late.
    Unrecorded(ClassificationResult),
    Ignored { event_kind: String },
    Miss { correlation_key: String },
    Undecodable(DecodeError),
}

/// Single consumer of the merged envelope stream.
pub struct Correlator {
    config: CorrelatorConfig,
    store: Arc<CorrelationStore>,
    logs: OutcomeLogs,
    stats: Arc<RunStats>,
    histogram: LatencyHistogram,
}

impl Correlator {
    /// Builds a correlator writing to `logs`.
    ///
    /// # Errors
    ///
    /// Returns an error when the latency histogram cannot be allocated.
    pub fn new(
        config: CorrelatorConfig,
        store: Arc<CorrelationStore>,
        logs: OutcomeLogs,
        stats: Arc<RunStats>,
    ) -> AppResult<Self> {
        let histogram = LatencyHistogram::new().map_err(AppError::Histogram)?;
        Ok(Self {
            config,
            store,
            logs,
            stats,
            histogram,
        })
    }

    pub async fn handle(&mut self, envelope: &InboundEnvelope) -> CorrelationOutcome {
        self.handle_at(envelope, Instant::now()).await
    }

    /// Correlates `envelope` as if it arrived at `now`.
    pub async fn handle_at(
        &mut self,
        envelope: &InboundEnvelope,
        now: Instant,
    ) -> CorrelationOutcome {
        self.stats.record_received();
        debug!(
            "Received message from stream '{}' ({} bytes).",
            envelope.source_stream_id,
            envelope.payload.len()
        );

        let event = match decode_confirmation(&envelope.payload) {
            Ok(event) => event,
            Err(err) => return self.undecodable(envelope, err),
        };
        if event.event_kind != self.config.confirmation_kind {
            self.stats.record_ignored();
            return CorrelationOutcome::Ignored {
                event_kind: event.event_kind,
            };
        }
        let entity = match event.decode_inner() {
            Ok(entity) => entity,
            Err(err) => return self.undecodable(envelope, err),
        };
        log_delivery_lag(&event, &entity.correlation_key);

        let Some(dispatched_at) = self.store.take(&entity.correlation_key) else {
            self.stats.record_miss();
            debug!(
                "No dispatch recorded for '{}' ({}); ignoring confirmation.",
                entity.correlation_key, entity.entity_name
            );
            return CorrelationOutcome::Miss {
                correlation_key: entity.correlation_key,
            };
        };

        let elapsed = now.saturating_duration_since(dispatched_at);
        let result =
            ClassificationResult::new(entity.correlation_key, elapsed, self.config.late_threshold);
        if let Err(err) = self.logs.record(&result).await {
            error!("{}", err);
            self.stats.record_write_failure();
            return CorrelationOutcome::Unrecorded(result);
        }
        match result.bucket {
            Bucket::OnTime => self.stats.record_on_time(),
            Bucket::Late => self.stats.record_late(),
        }
        if let Err(err) = self.histogram.record(elapsed) {
            warn!("{}", err);
        }
        debug!(
            "Confirmed '{}' ({}) after {:?}: {}.",
            result.correlation_key,
            entity.entity_name,
            result.elapsed,
            result.bucket.as_str()
        );

        CorrelationOutcome::Classified(result)
    }

    fn undecodable(&self, envelope: &InboundEnvelope, err: DecodeError) -> CorrelationOutcome {
        self.stats.record_decode_failure();
        warn!(
            "Dropping message from stream '{}': {}",
            envelope.source_stream_id, err
        );
        CorrelationOutcome::Undecodable(err)
    }

    #[must_use]
    pub fn latency_summary(&self) -> LatencySummary {
        self.histogram.summary()
    }

    /// Consumes envelopes until every producer has gone away.
    pub async fn run(mut self, mut envelopes: mpsc::Receiver<InboundEnvelope>) -> LatencySummary {
        while let Some(envelope) = envelopes.recv().await {
            self.handle(&envelope).await;
        }
        debug!("Merged stream closed; correlator exiting.");
        self.latency_summary()
    }

    #[must_use]
    pub fn spawn(self, envelopes: mpsc::Receiver<InboundEnvelope>) -> JoinHandle<LatencySummary> {
        tokio::spawn(self.run(envelopes))
    }
}

fn log_delivery_lag(event: &ConfirmationEvent, correlation_key: &str) {
    if event.emitted_at_ms <= 0 {
        return;
    }
    let lag_ms = chrono::Utc::now()
        .timestamp_millis()
        .saturating_sub(event.emitted_at_ms);
    debug!(
        "Confirmation for '{}' delivered {}ms after it was emitted.",
        correlation_key, lag_ms
    );
}
