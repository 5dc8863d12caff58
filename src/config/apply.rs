use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{LatencyArgs, PositiveU64, PositiveUsize, parse_header};
use crate::error::{AppError, AppResult, ConfigError};

use super::parse::{delay_duration, positive_duration};
use super::types::{ConfigFile, TriggerConfig};

/// Applies configuration values to CLI arguments. Values given explicitly on
/// the command line win.
///
/// # Errors
///
/// Returns an error when a config value is out of range or malformed.
pub fn apply_config(
    args: &mut LatencyArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "work_items")
        && let Some(path) = config.work_items.clone()
    {
        args.work_items = Some(path);
    }

    if !is_cli(matches, "streams")
        && let Some(path) = config.streams.clone()
    {
        args.streams = Some(path);
    }

    if !is_cli(matches, "concurrency")
        && let Some(concurrency) = config.concurrency
    {
        args.concurrency = ensure_positive_usize(concurrency, "concurrency")?;
    }

    if !is_cli(matches, "min_delay")
        && let Some(delay) = config.min_delay.as_ref()
    {
        args.min_delay = delay_duration(delay, "min_delay")?;
    }

    if !is_cli(matches, "max_delay")
        && let Some(delay) = config.max_delay.as_ref()
    {
        args.max_delay = delay_duration(delay, "max_delay")?;
    }

    if !is_cli(matches, "rate")
        && let Some(rate) = config.rate
    {
        args.rate = Some(ensure_positive_u64(rate, "rate")?);
    }

    if !is_cli(matches, "max_dispatches")
        && let Some(limit) = config.max_dispatches
    {
        args.max_dispatches = Some(ensure_positive_u64(limit, "max_dispatches")?);
    }

    if !is_cli(matches, "threshold")
        && let Some(threshold) = config.threshold.as_ref()
    {
        args.threshold = positive_duration(threshold, "threshold")?;
    }

    if !is_cli(matches, "on_time_log")
        && let Some(path) = config.on_time_log.clone()
    {
        args.on_time_log = path;
    }

    if !is_cli(matches, "late_log")
        && let Some(path) = config.late_log.clone()
    {
        args.late_log = path;
    }

    if !is_cli(matches, "channel_capacity")
        && let Some(capacity) = config.channel_capacity
    {
        args.channel_capacity = ensure_positive_usize(capacity, "channel_capacity")?;
    }

    if !is_cli(matches, "confirmation_kind")
        && let Some(kind) = config.confirmation_kind.clone()
    {
        args.confirmation_kind = kind;
    }

    if !is_cli(matches, "store_ttl")
        && let Some(ttl) = config.store_ttl.as_ref()
    {
        args.store_ttl = positive_duration(ttl, "store_ttl")?;
    }

    if !is_cli(matches, "sweep_interval")
        && let Some(interval) = config.sweep_interval.as_ref()
    {
        args.sweep_interval = positive_duration(interval, "sweep_interval")?;
    }

    if !is_cli(matches, "duration")
        && let Some(duration) = config.duration.as_ref()
    {
        args.duration = Some(positive_duration(duration, "duration")?);
    }

    if !is_cli(matches, "reconnect_delay")
        && let Some(delay) = config.reconnect_delay.as_ref()
    {
        args.reconnect_delay = delay_duration(delay, "reconnect_delay")?;
    }

    if !is_cli(matches, "receive_timeout")
        && let Some(timeout) = config.receive_timeout.as_ref()
    {
        args.receive_timeout = positive_duration(timeout, "receive_timeout")?;
    }

    if !is_cli(matches, "verbose")
        && let Some(verbose) = config.verbose
    {
        args.verbose = verbose;
    }

    if !is_cli(matches, "no_color")
        && let Some(no_color) = config.no_color
    {
        args.no_color = no_color;
    }

    if let Some(trigger) = config.trigger.as_ref() {
        apply_trigger_config(args, matches, trigger)?;
    }

    Ok(())
}

fn apply_trigger_config(
    args: &mut LatencyArgs,
    matches: &ArgMatches,
    trigger: &TriggerConfig,
) -> AppResult<()> {
    if !is_cli(matches, "trigger_method")
        && let Some(method) = trigger.method
    {
        args.trigger_method = method;
    }

    if !is_cli(matches, "trigger_url")
        && let Some(url) = trigger.url.clone()
    {
        args.trigger_url = Some(url);
    }

    if !is_cli(matches, "trigger_body")
        && let Some(body) = trigger.body.clone()
    {
        args.trigger_body = Some(body);
    }

    if !is_cli(matches, "trigger_headers")
        && let Some(headers) = trigger.headers.as_ref()
    {
        let mut parsed = Vec::with_capacity(headers.len());
        for header in headers {
            parsed.push(parse_header(header).map_err(|err| {
                AppError::config(ConfigError::InvalidHeader { source: err })
            })?);
        }
        args.trigger_headers = parsed;
    }

    if !is_cli(matches, "trigger_timeout")
        && let Some(timeout) = trigger.timeout.as_ref()
    {
        args.trigger_timeout = positive_duration(timeout, "trigger.timeout")?;
    }

    if !is_cli(matches, "insecure")
        && let Some(insecure) = trigger.insecure
    {
        args.insecure = insecure;
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn ensure_positive_u64(value: u64, field: &str) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}

fn ensure_positive_usize(value: usize, field: &str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}
