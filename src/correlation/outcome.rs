use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::error::OutcomeError;

use super::classify::{Bucket, ClassificationResult};

/// Line-oriented outcome file. Each record goes out in a single write.
#[derive(Debug)]
pub struct OutcomeLog {
    path: PathBuf,
    file: File,
}

impl OutcomeLog {
    /// Creates (or truncates) the log at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be created.
    pub async fn create(path: &Path) -> Result<Self, OutcomeError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .await
            .map_err(|err| OutcomeError::Open {
                path: path.to_path_buf(),
                source: err,
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Appends one complete line.
    ///
    /// # Errors
    ///
    /// Returns an error when the write or flush fails.
    pub async fn append_line(&mut self, line: &str) -> Result<(), OutcomeError> {
        self.file
            .write_all(line.as_bytes())
            .await
            .map_err(|err| OutcomeError::Append {
                path: self.path.clone(),
                source: err,
            })?;
        self.file.flush().await.map_err(|err| OutcomeError::Append {
            path: self.path.clone(),
            source: err,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The on-time and late logs, owned by the correlator.
#[derive(Debug)]
pub struct OutcomeLogs {
    on_time: OutcomeLog,
    late: OutcomeLog,
}

impl OutcomeLogs {
    /// Creates both outcome logs.
    ///
    /// # Errors
    ///
    /// Returns an error when either file cannot be created.
    pub async fn create(on_time: &Path, late: &Path) -> Result<Self, OutcomeError> {
        Ok(Self {
            on_time: OutcomeLog::create(on_time).await?,
            late: OutcomeLog::create(late).await?,
        })
    }

    /// Writes `result` to the log matching its bucket.
    ///
    /// # Errors
    ///
    /// Returns an error when the append fails.
    pub async fn record(&mut self, result: &ClassificationResult) -> Result<(), OutcomeError> {
        let line = result.outcome_line();
        match result.bucket {
            Bucket::OnTime => self.on_time.append_line(&line).await,
            Bucket::Late => self.late.append_line(&line).await,
        }
    }
}
