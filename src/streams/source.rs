use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::StreamDescriptor;
use crate::error::StreamError;

/// One message held by a subscription until it is completed.
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    pub payload: Bytes,
    /// Broker handle used to acknowledge the message, if the source needs one.
    pub receipt: Option<String>,
}

impl ReceivedMessage {
    #[must_use]
    pub fn new(payload: impl Into<Bytes>, receipt: Option<String>) -> Self {
        Self {
            payload: payload.into(),
            receipt,
        }
    }
}

/// Opens subscriptions on inbound event streams.
#[async_trait]
pub trait StreamSource: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the stream cannot be reached or the
    /// subscription cannot be created.
    async fn open(&self, descriptor: &StreamDescriptor) -> Result<Box<dyn Subscription>, StreamError>;
}

/// A live subscription on one stream.
#[async_trait]
pub trait Subscription: Send {
    fn stream_id(&self) -> &str;

    /// Waits for the next message. `Ok(None)` means the stream ended.
    ///
    /// # Errors
    ///
    /// Returns an error when the receive call fails.
    async fn receive_next(&mut self) -> Result<Option<ReceivedMessage>, StreamError>;

    /// Acknowledges a message so the broker does not redeliver it.
    ///
    /// # Errors
    ///
    /// Returns an error when the broker rejects the acknowledgement.
    async fn complete(&mut self, message: &ReceivedMessage) -> Result<(), StreamError>;

    /// Releases broker-side resources. Failures are logged, not returned.
    async fn close(&mut self);
}
