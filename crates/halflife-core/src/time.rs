//! Human time specifications converted to seconds.
//!
//! Half-lives and simulation horizons are written as `<number> <unit>`,
//! e.g. `"5.75 a"` or `"3.66 d"`. Supported units are listed in [`UNITS`].

use std::fmt;
use std::str::FromStr;

use crate::constants::SECONDS_PER_YEAR;
use crate::error::ChainError;

/// Accepted unit spellings, for help texts.
pub const UNITS: &str = "ns, s, min, h, d, a (for year)";

/// A unit of time accepted in half-life and horizon specifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Nanoseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
    /// 365-day year.
    Years,
}

impl TimeUnit {
    /// Number of seconds in one of this unit.
    pub fn seconds(self) -> f64 {
        match self {
            Self::Nanoseconds => 1e-9,
            Self::Seconds => 1.0,
            Self::Minutes => 60.0,
            Self::Hours => 3600.0,
            Self::Days => 24.0 * 3600.0,
            Self::Years => SECONDS_PER_YEAR,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Nanoseconds => "ns",
            Self::Seconds => "s",
            Self::Minutes => "min",
            Self::Hours => "h",
            Self::Days => "d",
            Self::Years => "a",
        }
    }
}

impl FromStr for TimeUnit {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ns" => Ok(Self::Nanoseconds),
            "s" => Ok(Self::Seconds),
            "min" => Ok(Self::Minutes),
            "h" => Ok(Self::Hours),
            "d" => Ok(Self::Days),
            "a" => Ok(Self::Years),
            other => Err(ChainError::UnknownTimeUnit(other.to_string())),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Convert `value` expressed in `unit` to seconds.
///
/// Nanoseconds divide by 10^9 rather than multiplying by 10^-9 so that
/// round values stay exact.
pub fn to_seconds(value: f64, unit: TimeUnit) -> f64 {
    match unit {
        TimeUnit::Nanoseconds => value / 1e9,
        other => value * other.seconds(),
    }
}

/// Parse a `"<number> <unit>"` string into seconds.
///
/// The result is not range-checked; callers decide whether zero or negative
/// durations are acceptable.
pub fn parse_duration(s: &str) -> Result<f64, ChainError> {
    let mut parts = s.split_whitespace();
    let (Some(value), Some(unit), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ChainError::MalformedDuration(s.to_string()));
    };
    let value: f64 = value
        .parse()
        .map_err(|_| ChainError::MalformedDuration(s.to_string()))?;
    let unit: TimeUnit = unit.parse()?;
    Ok(to_seconds(value, unit))
}

/// Render seconds with the largest unit that keeps the value at or above 1.
pub fn format_seconds(secs: f64) -> String {
    const ORDER: [TimeUnit; 6] = [
        TimeUnit::Years,
        TimeUnit::Days,
        TimeUnit::Hours,
        TimeUnit::Minutes,
        TimeUnit::Seconds,
        TimeUnit::Nanoseconds,
    ];
    let unit = ORDER
        .into_iter()
        .find(|u| secs.abs() >= u.seconds())
        .unwrap_or(TimeUnit::Nanoseconds);
    format!("{:.4} {}", secs / unit.seconds(), unit)
}
