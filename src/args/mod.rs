//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use cli::LatencyArgs;
pub use defaults::{DEFAULT_LATE_LOG, DEFAULT_ON_TIME_LOG};
pub use parsers::{parse_delay_arg, parse_duration_arg, parse_header};
pub use types::{HttpMethod, PositiveU64, PositiveUsize};
