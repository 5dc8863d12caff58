//! Matching confirmation events back to their dispatches.
mod classify;
mod correlator;
mod event;
mod outcome;
mod store;


pub use classify::{
    Bucket, ClassificationResult, DEFAULT_LATE_THRESHOLD, classify, format_elapsed,
};
pub use correlator::{CorrelationOutcome, Correlator, CorrelatorConfig, DEFAULT_CONFIRMATION_KIND};
pub use event::{ConfirmationEvent, ConfirmedEntity, decode_confirmation};
pub use outcome::{OutcomeLog, OutcomeLogs};
pub use store::{CorrelationStore, spawn_store_sweeper};
