use serde::Deserialize;

use crate::args::HttpMethod;

/// Every knob of the CLI, settable from `deploylat.toml` / `deploylat.json`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub work_items: Option<String>,
    pub streams: Option<String>,
    pub concurrency: Option<usize>,
    pub min_delay: Option<DurationValue>,
    pub max_delay: Option<DurationValue>,
    pub rate: Option<u64>,
    pub max_dispatches: Option<u64>,
    pub threshold: Option<DurationValue>,
    pub on_time_log: Option<String>,
    pub late_log: Option<String>,
    pub channel_capacity: Option<usize>,
    pub confirmation_kind: Option<String>,
    pub store_ttl: Option<DurationValue>,
    pub sweep_interval: Option<DurationValue>,
    pub duration: Option<DurationValue>,
    pub reconnect_delay: Option<DurationValue>,
    pub receive_timeout: Option<DurationValue>,
    pub verbose: Option<bool>,
    pub no_color: Option<bool>,
    pub trigger: Option<TriggerConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerConfig {
    pub method: Option<HttpMethod>,
    pub url: Option<String>,
    pub body: Option<String>,
    pub headers: Option<Vec<String>>,
    pub timeout: Option<DurationValue>,
    pub insecure: Option<bool>,
}

/// Plain integers are seconds; strings use the CLI duration syntax.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}
