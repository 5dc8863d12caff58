use std::time::Duration;

/// Confirmations slower than this are written to the late log.
pub const DEFAULT_LATE_THRESHOLD: Duration = Duration::from_secs(60);

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;
const SECS_PER_MIN: u64 = 60;
const SECS_PER_HOUR: u64 = 3_600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    OnTime,
    Late,
}

impl Bucket {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Bucket::OnTime => "on-time",
            Bucket::Late => "late",
        }
    }
}

/// `elapsed == threshold` counts as on time.
#[must_use]
pub fn classify(elapsed: Duration, threshold: Duration) -> Bucket {
    if elapsed > threshold {
        Bucket::Late
    } else {
        Bucket::OnTime
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub correlation_key: String,
    pub elapsed: Duration,
    pub bucket: Bucket,
}

impl ClassificationResult {
    #[must_use]
    pub fn new(correlation_key: String, elapsed: Duration, threshold: Duration) -> Self {
        Self {
            correlation_key,
            elapsed,
            bucket: classify(elapsed, threshold),
        }
    }

    /// `<correlation key> diff:<elapsed>\n`
    #[must_use]
    pub fn outcome_line(&self) -> String {
        format!(
            "{} diff:{}\n",
            self.correlation_key,
            format_elapsed(self.elapsed)
        )
    }
}

/// Formats a duration the way operators read it in the outcome logs:
/// `250ms`, `10s`, `1m10.5s`, `1h0m3s`.
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let nanos = elapsed.as_nanos();
    if nanos == 0 {
        return "0s".to_owned();
    }
    if nanos < NANOS_PER_MICRO {
        return format!("{}ns", nanos);
    }
    if nanos < NANOS_PER_MILLI {
        return format!("{}µs", fixed_point(nanos, NANOS_PER_MICRO, 3));
    }
    if nanos < NANOS_PER_SEC {
        return format!("{}ms", fixed_point(nanos, NANOS_PER_MILLI, 6));
    }

    let total_secs = elapsed.as_secs();
    let hours = total_secs.checked_div(SECS_PER_HOUR).unwrap_or(0);
    let minutes = total_secs
        .checked_rem(SECS_PER_HOUR)
        .and_then(|rest| rest.checked_div(SECS_PER_MIN))
        .unwrap_or(0);
    let secs = total_secs.checked_rem(SECS_PER_MIN).unwrap_or(0);
    let secs_nanos = u128::from(secs)
        .saturating_mul(NANOS_PER_SEC)
        .saturating_add(u128::from(elapsed.subsec_nanos()));
    let seconds = fixed_point(secs_nanos, NANOS_PER_SEC, 9);

    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

fn fixed_point(value: u128, unit: u128, fraction_digits: usize) -> String {
    let whole = value.checked_div(unit).unwrap_or(0);
    let fraction = value.checked_rem(unit).unwrap_or(0);
    if fraction == 0 {
        return whole.to_string();
    }
    let digits = format!("{:0width$}", fraction, width = fraction_digits);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}
