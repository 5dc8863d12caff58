use std::time::Duration;

use tracing::info;

use crate::shutdown::ShutdownSender;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Broadcasts shutdown on Ctrl+C or SIGTERM. Exits quietly if shutdown
/// is triggered elsewhere first, including before the task is first polled.
#[must_use]
pub fn setup_signal_shutdown_handler(shutdown_tx: &ShutdownSender) -> tokio::task::JoinHandle<()> {
    let shutdown_tx = shutdown_tx.clone();
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::spawn(async move {
        #[cfg(unix)]
        let mut term_signal = signal(SignalKind::terminate())
            .inspect_err(|err| tracing::warn!("Failed to register SIGTERM handler: {}", err))
            .ok();

        #[cfg(unix)]
        {
            tokio::select! {
                _ = shutdown_rx.recv() => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupt received, stopping dispatch.");
                    drop(shutdown_tx.send(()));
                }
                () = async {
                    if let Some(signal) = term_signal.as_mut() {
                        signal.recv().await;
                    } else {
                        std::future::pending::<()>().await;
                    }
                } => {
                    info!("SIGTERM received, stopping dispatch.");
                    drop(shutdown_tx.send(()));
                }
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                _ = shutdown_rx.recv() => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupt received, stopping dispatch.");
                    drop(shutdown_tx.send(()));
                }
            }
        }
    })
}

/// Broadcasts shutdown once `run_for` has elapsed.
#[must_use]
pub fn setup_duration_shutdown_handler(
    shutdown_tx: &ShutdownSender,
    run_for: Duration,
) -> tokio::task::JoinHandle<()> {
    let shutdown_tx = shutdown_tx.clone();
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::spawn(async move {
        tokio::select! {
            _ = shutdown_rx.recv() => {}
            () = tokio::time::sleep(run_for) => {
                info!("Run duration of {}s reached.", run_for.as_secs());
                drop(shutdown_tx.send(()));
            }
        }
    })
}
