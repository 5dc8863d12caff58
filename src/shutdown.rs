use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

pub type ShutdownSender = broadcast::Sender<()>;
pub type ShutdownReceiver = broadcast::Receiver<()>;

/// Every listener sees the same single stop notification.
const SHUTDOWN_CHANNEL_CAPACITY: usize = 1;

#[must_use]
pub fn shutdown_channel() -> (ShutdownSender, ShutdownReceiver) {
    broadcast::channel::<()>(SHUTDOWN_CHANNEL_CAPACITY)
}

/// Waits until a shutdown has been sent. A lagged receiver missed at least
/// one shutdown, so it counts as one. Returns `false` only when every sender
/// was dropped first.
#[must_use]
pub async fn wait_for_shutdown(shutdown_rx: &mut ShutdownReceiver) -> bool {
    !matches!(shutdown_rx.recv().await, Err(RecvError::Closed))
}
