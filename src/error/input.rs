use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("'{path}' line {line}: expected 4 comma-separated fields, found {found}.")]
    WorkItemFieldCount {
        path: PathBuf,
        line: usize,
        found: usize,
    },
    #[error("'{path}' line {line}: field {field} is empty.")]
    WorkItemEmptyField {
        path: PathBuf,
        line: usize,
        field: &'static str,
    },
    #[error("Work items file '{path}' was empty.")]
    WorkItemsEmpty { path: PathBuf },
    #[error("Missing connection string for topic '{topic}' in '{path}'.")]
    MissingConnectionString { path: PathBuf, topic: String },
    #[error("Streams file '{path}' was empty.")]
    StreamsEmpty { path: PathBuf },
}
