use clap::Parser;
use std::time::Duration;

use crate::correlation::DEFAULT_CONFIRMATION_KIND;

use super::defaults::{
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_CONCURRENCY, DEFAULT_LATE_LOG, DEFAULT_MAX_DELAY,
    DEFAULT_MIN_DELAY, DEFAULT_ON_TIME_LOG, DEFAULT_RECEIVE_TIMEOUT, DEFAULT_RECONNECT_DELAY,
    DEFAULT_STORE_TTL, DEFAULT_SWEEP_INTERVAL, DEFAULT_THRESHOLD, DEFAULT_TRIGGER_TIMEOUT,
};
use super::parsers::{
    parse_bool_env, parse_delay_arg, parse_duration_arg, parse_header, parse_positive_u64,
    parse_positive_usize,
};
use super::types::{HttpMethod, PositiveU64, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Async deployment-latency harness - dispatches operations under a concurrency cap, listens on many confirmation streams, and classifies every confirmed operation as on-time or late."
)]
pub struct LatencyArgs {
    /// Work item file, one `target,group,operation,variant` per line
    #[arg(long = "work-items", short = 'w')]
    pub work_items: Option<String>,

    /// Stream descriptor file, alternating topic and connection string lines
    #[arg(long = "streams", short = 's')]
    pub streams: Option<String>,

    /// Maximum number of trigger calls in flight
    #[arg(
        long,
        short = 'c',
        default_value = DEFAULT_CONCURRENCY,
        value_parser = parse_positive_usize
    )]
    pub concurrency: PositiveUsize,

    /// Shortest pause between two launches (supports ms/s/m/h)
    #[arg(long = "min-delay", default_value = DEFAULT_MIN_DELAY, value_parser = parse_delay_arg)]
    pub min_delay: Duration,

    /// Longest pause between two launches (supports ms/s/m/h)
    #[arg(long = "max-delay", default_value = DEFAULT_MAX_DELAY, value_parser = parse_delay_arg)]
    pub max_delay: Duration,

    /// Cap on launches per second
    #[arg(long, short = 'r', value_parser = parse_positive_u64)]
    pub rate: Option<PositiveU64>,

    /// Stop dispatching after this many launches
    #[arg(long = "max-dispatches", value_parser = parse_positive_u64)]
    pub max_dispatches: Option<PositiveU64>,

    /// Confirmations slower than this are late (supports ms/s/m/h)
    #[arg(long, short = 't', default_value = DEFAULT_THRESHOLD, value_parser = parse_duration_arg)]
    pub threshold: Duration,

    /// File receiving on-time outcome lines (truncated at start)
    #[arg(long = "on-time-log", default_value = DEFAULT_ON_TIME_LOG)]
    pub on_time_log: String,

    /// File receiving late outcome lines (truncated at start)
    #[arg(long = "late-log", default_value = DEFAULT_LATE_LOG)]
    pub late_log: String,

    /// Capacity of the merged confirmation buffer
    #[arg(
        long = "channel-capacity",
        default_value = DEFAULT_CHANNEL_CAPACITY,
        value_parser = parse_positive_usize
    )]
    pub channel_capacity: PositiveUsize,

    /// Event kind that confirms a dispatched operation
    #[arg(long = "confirmation-kind", default_value = DEFAULT_CONFIRMATION_KIND)]
    pub confirmation_kind: String,

    /// Unconfirmed dispatch records older than this are dropped (supports ms/s/m/h)
    #[arg(long = "store-ttl", default_value = DEFAULT_STORE_TTL, value_parser = parse_duration_arg)]
    pub store_ttl: Duration,

    /// How often expired dispatch records are swept (supports ms/s/m/h)
    #[arg(
        long = "sweep-interval",
        default_value = DEFAULT_SWEEP_INTERVAL,
        value_parser = parse_duration_arg
    )]
    pub sweep_interval: Duration,

    /// Stop the whole run after this long (supports ms/s/m/h)
    #[arg(long, short = 'd', value_parser = parse_duration_arg)]
    pub duration: Option<Duration>,

    /// Pause before re-opening a stream after a receive error (supports ms/s/m/h)
    #[arg(
        long = "reconnect-delay",
        default_value = DEFAULT_RECONNECT_DELAY,
        value_parser = parse_delay_arg
    )]
    pub reconnect_delay: Duration,

    /// Broker-side wait of one receive call (supports ms/s/m/h)
    #[arg(
        long = "receive-timeout",
        default_value = DEFAULT_RECEIVE_TIMEOUT,
        value_parser = parse_duration_arg
    )]
    pub receive_timeout: Duration,

    /// HTTP method of the trigger request
    #[arg(long = "trigger-method", short = 'X', default_value = "post", ignore_case = true)]
    pub trigger_method: HttpMethod,

    /// Trigger URL template; {{target}}, {{group}}, {{operation}} and {{variant}} are expanded
    #[arg(long = "trigger-url", short = 'u')]
    pub trigger_url: Option<String>,

    /// Trigger body template
    #[arg(long = "trigger-body")]
    pub trigger_body: Option<String>,

    /// Trigger header template 'Key: Value' (repeatable)
    #[arg(long = "trigger-header", short = 'H', value_parser = parse_header)]
    pub trigger_headers: Vec<(String, String)>,

    /// Timeout of one trigger request (supports ms/s/m/h)
    #[arg(
        long = "trigger-timeout",
        default_value = DEFAULT_TRIGGER_TIMEOUT,
        value_parser = parse_duration_arg
    )]
    pub trigger_timeout: Duration,

    /// Accept invalid TLS certificates on trigger requests
    #[arg(long)]
    pub insecure: bool,

    /// Enable verbose logging (sets log level to debug unless overridden by DEPLOYLAT_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,

    /// Path to config file (TOML/JSON). Defaults to ./deploylat.toml or ./deploylat.json if present.
    #[arg(long)]
    pub config: Option<String>,
}
