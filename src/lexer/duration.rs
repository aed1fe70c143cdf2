//! Duration literal parser.
//!
//! Durations appear in range selectors (`metric[5m]`) and offset modifiers
//! (`metric offset 1h`). The grammar is `<positive integer><unit>` with
//! unit one of `s`, `m`, `h`, `d`, `w`, `y`.
//!
//! Digits followed by a unit letter are only a duration in those grammar
//! positions; everywhere else `5m` would be a number followed by an
//! identifier. The expression parser therefore invokes [`duration`] only
//! inside `[...]` and after `offset`.

use std::fmt;
use std::str::FromStr;

use nom::{
    IResult, Parser,
    character::complete::{digit1, one_of},
    combinator::{all_consuming, map_opt},
    sequence::pair,
};

use crate::error::Error;

/// Time units recognized in duration literals, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Year,
}

impl DurationUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationUnit::Second => "s",
            DurationUnit::Minute => "m",
            DurationUnit::Hour => "h",
            DurationUnit::Day => "d",
            DurationUnit::Week => "w",
            DurationUnit::Year => "y",
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            's' => Some(DurationUnit::Second),
            'm' => Some(DurationUnit::Minute),
            'h' => Some(DurationUnit::Hour),
            'd' => Some(DurationUnit::Day),
            'w' => Some(DurationUnit::Week),
            'y' => Some(DurationUnit::Year),
            _ => None,
        }
    }

    /// Length of one unit in seconds (a year is 365 days).
    pub fn secs(&self) -> u64 {
        match self {
            DurationUnit::Second => 1,
            DurationUnit::Minute => 60,
            DurationUnit::Hour => 3_600,
            DurationUnit::Day => 86_400,
            DurationUnit::Week => 604_800,
            DurationUnit::Year => 31_536_000,
        }
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A duration literal such as `5m` or `1h`.
///
/// The value/unit pair is kept as written so the query round-trips exactly;
/// [`Duration::as_secs`] gives the normalized magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration {
    pub value: u64,
    pub unit: DurationUnit,
}

impl Duration {
    pub fn new(value: u64, unit: DurationUnit) -> Self {
        Self { value, unit }
    }

    /// Total length in seconds, saturating on overflow.
    pub fn as_secs(&self) -> u64 {
        self.value.saturating_mul(self.unit.secs())
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

impl FromStr for Duration {
    type Err = Error;

    /// Validate a complete duration string, e.g. a builder argument like
    /// `with_range("10m")`.
    fn from_str(s: &str) -> Result<Self, Error> {
        all_consuming(duration)
            .parse(s)
            .map(|(_, d)| d)
            .map_err(|_| Error::InvalidDuration(s.to_string()))
    }
}

/// Parse a duration literal: `<positive integer><unit>`. Zero-length
/// windows (`0s`, `00m`) are rejected along with non-digit values.
pub fn duration(input: &str) -> IResult<&str, Duration> {
    map_opt(
        pair(digit1, one_of("smhdwy")),
        |(digits, unit): (&str, char)| {
            let value = digits.parse::<u64>().ok().filter(|&v| v > 0)?;
            let unit = DurationUnit::from_char(unit)?;
            Some(Duration::new(value, unit))
        },
    )
    .parse(input)
}
