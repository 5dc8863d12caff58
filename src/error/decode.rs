use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Malformed confirmation envelope: {source}")]
    Envelope {
        #[source]
        source: serde_json::Error,
    },
    #[error("Inner event is not valid base64: {source}")]
    InnerBase64 {
        #[source]
        source: base64::DecodeError,
    },
    #[error("Malformed inner event: {source}")]
    InnerEvent {
        #[source]
        source: serde_json::Error,
    },
    #[error("Inner event has an empty correlation key.")]
    EmptyCorrelationKey,
}
