use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutcomeError {
    #[error("Failed to open outcome log '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to append to outcome log '{path}': {source}")]
    Append {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
