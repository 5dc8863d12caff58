use std::time::Duration;

use crate::args::{parse_delay_arg, parse_duration_arg};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};

use super::types::DurationValue;

/// Resolves a strictly positive duration field.
pub(super) fn positive_duration(value: &DurationValue, field: &'static str) -> AppResult<Duration> {
    let parsed = match value {
        DurationValue::Seconds(0) => Err(ValidationError::DurationZero),
        DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
        DurationValue::Text(text) => parse_duration_arg(text),
    };
    parsed.map_err(|err| invalid(field, err))
}

/// Resolves a duration field where zero switches the pause off.
pub(super) fn delay_duration(value: &DurationValue, field: &'static str) -> AppResult<Duration> {
    let parsed = match value {
        DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
        DurationValue::Text(text) => parse_delay_arg(text),
    };
    parsed.map_err(|err| invalid(field, err))
}

fn invalid(field: &'static str, source: ValidationError) -> AppError {
    AppError::config(ConfigError::InvalidDuration { field, source })
}
