use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Invalid connection string: {reason}")]
    InvalidConnectionString { reason: &'static str },
    #[error("Invalid endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Failed to sign access token: {reason}")]
    Signature { reason: String },
    #[error("Failed to build stream client: {source}")]
    BuildClient {
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to create subscription '{subscription}' on '{topic}': {detail}")]
    CreateSubscription {
        topic: String,
        subscription: String,
        detail: String,
    },
    #[error("Receive from '{stream}' failed: {detail}")]
    Receive { stream: String, detail: String },
    #[error("Completing message on '{stream}' failed: {detail}")]
    Complete { stream: String, detail: String },
    #[error("{message}")]
    Other { message: String },
}
