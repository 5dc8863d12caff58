use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::domain::{InboundEnvelope, StreamDescriptor};
use crate::metrics::RunStats;
use crate::shutdown::{ShutdownReceiver, ShutdownSender};

use super::source::{StreamSource, Subscription};

#[derive(Debug, Clone, Copy)]
pub struct FanInConfig {
    /// Capacity of the merged buffer. Subscribers block when it is full.
    pub channel_capacity: usize,
    /// Pause before re-opening a stream after a receive error.
    pub reconnect_delay: Duration,
}

/// The merged stream plus the subscriber tasks feeding it. The receiver
/// closes once every subscriber has stopped.
pub struct FanIn {
    pub envelopes: mpsc::Receiver<InboundEnvelope>,
    pub subscribers: Vec<JoinHandle<()>>,
}

impl FanIn {
    pub async fn join_subscribers(subscribers: Vec<JoinHandle<()>>) {
        for handle in subscribers {
            if let Err(err) = handle.await {
                error!("Stream subscriber task failed: {}", err);
            }
        }
    }
}

/// Spawns one subscriber per descriptor, all writing into one bounded buffer.
#[must_use]
pub fn spawn_fan_in(
    source: Arc<dyn StreamSource>,
    descriptors: Vec<StreamDescriptor>,
    config: FanInConfig,
    stats: Arc<RunStats>,
    shutdown_tx: &ShutdownSender,
) -> FanIn {
    let (tx, envelopes) = mpsc::channel(config.channel_capacity.max(1));
    let subscribers = descriptors
        .into_iter()
        .map(|descriptor| {
            let subscriber = Subscriber {
                source: Arc::clone(&source),
                stream_id: Arc::from(descriptor.stream_id.as_str()),
                descriptor,
                tx: tx.clone(),
                stats: Arc::clone(&stats),
                reconnect_delay: config.reconnect_delay,
            };
            let shutdown_rx = shutdown_tx.subscribe();
            tokio::spawn(subscriber.run(shutdown_rx))
        })
        .collect();
    FanIn {
        envelopes,
        subscribers,
    }
}

struct Subscriber {
    source: Arc<dyn StreamSource>,
    descriptor: StreamDescriptor,
    stream_id: Arc<str>,
    tx: mpsc::Sender<InboundEnvelope>,
    stats: Arc<RunStats>,
    reconnect_delay: Duration,
}

impl Subscriber {
    async fn run(self, mut shutdown_rx: ShutdownReceiver) {
        let Some(mut subscription) = self.open(&mut shutdown_rx).await else {
            return;
        };
        info!("Subscribed to stream {}.", self.stream_id);

        loop {
            let received = tokio::select! {
                _ = shutdown_rx.recv() => break,
                received = subscription.receive_next() => received,
            };

            match received {
                Ok(Some(message)) => {
                    debug!(
                        "Received {} bytes from stream {}.",
                        message.payload.len(),
                        self.stream_id
                    );
                    let envelope =
                        InboundEnvelope::new(Arc::clone(&self.stream_id), message.payload.clone());
                    let sent = tokio::select! {
                        _ = shutdown_rx.recv() => break,
                        sent = self.tx.send(envelope) => sent,
                    };
                    if sent.is_err() {
                        warn!("Merged stream closed, stopping stream {}.", self.stream_id);
                        break;
                    }
                    // Only acknowledged once it sits in the merged buffer.
                    if let Err(err) = subscription.complete(&message).await {
                        warn!("{}", err);
                    }
                }
                Ok(None) => {
                    info!("Stream {} ended.", self.stream_id);
                    break;
                }
                Err(err) => {
                    warn!(
                        "{}; reconnecting in {}ms.",
                        err,
                        self.reconnect_delay.as_millis()
                    );
                    subscription.close().await;
                    tokio::select! {
                        _ = shutdown_rx.recv() => return,
                        () = sleep(self.reconnect_delay) => {}
                    }
                    match self.open(&mut shutdown_rx).await {
                        Some(reopened) => {
                            info!("Re-subscribed to stream {}.", self.stream_id);
                            subscription = reopened;
                        }
                        None => return,
                    }
                }
            }
        }

        subscription.close().await;
        debug!("Subscriber for stream {} stopped.", self.stream_id);
    }

    /// Opens the stream unless shutdown arrives first. Failures are fatal to
    /// this subscriber only.
    async fn open(&self, shutdown_rx: &mut ShutdownReceiver) -> Option<Box<dyn Subscription>> {
        let opened = tokio::select! {
            _ = shutdown_rx.recv() => return None,
            opened = self.source.open(&self.descriptor) => opened,
        };
        opened
            .inspect_err(|err| {
                error!("Failed to subscribe to stream {}: {}", self.stream_id, err);
                self.stats.record_failed_stream();
            })
            .ok()
    }
}
