use thiserror::Error;

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("Failed to build HTTP client: {source}")]
    BuildClient {
        #[source]
        source: reqwest::Error,
    },
    #[error("Invalid trigger URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid trigger header '{name}': {message}")]
    InvalidHeader { name: String, message: String },
    #[error("Trigger request failed: {source}")]
    Request {
        #[source]
        source: reqwest::Error,
    },
    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("{message}")]
    Rejected { message: String },
}
