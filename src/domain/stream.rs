use std::sync::Arc;

use bytes::Bytes;

/// Identity and connection details of one inbound event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    pub stream_id: String,
    pub connection: String,
}

impl StreamDescriptor {
    #[must_use]
    pub const fn new(stream_id: String, connection: String) -> Self {
        Self {
            stream_id,
            connection,
        }
    }
}

/// A raw message as forwarded by a subscriber into the fan-in buffer.
#[derive(Debug, Clone)]
pub struct InboundEnvelope {
    pub source_stream_id: Arc<str>,
    pub payload: Bytes,
}

impl InboundEnvelope {
    #[must_use]
    pub fn new(source_stream_id: Arc<str>, payload: impl Into<Bytes>) -> Self {
        Self {
            source_stream_id,
            payload: payload.into(),
        }
    }
}
