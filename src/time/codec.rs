//! Clock string <-> seconds conversion
//!
//! Recordings index samples by seconds since the start of the capture
//! (`78.3`), while clinicians read and type times as `M:SS.S` (`1:18.3`).
//! Both forms are accepted wherever a time is taken as input.

use crate::time::error::{CodecError, CodecResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn clock_pattern() -> &'static Regex {
    static CLOCK: OnceLock<Regex> = OnceLock::new();
    CLOCK.get_or_init(|| {
        Regex::new(r"^(\d+):(\d+(?:\.\d*)?|\.\d+)$").expect("clock pattern is valid")
    })
}

fn seconds_pattern() -> &'static Regex {
    static SECONDS: OnceLock<Regex> = OnceLock::new();
    SECONDS.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$")
            .expect("seconds pattern is valid")
    })
}

/// Convert `MM:SS.ss` or a bare number of seconds to seconds
pub fn to_seconds(value: &str) -> CodecResult<f64> {
    let trimmed = value.trim();

    if let Some(caps) = clock_pattern().captures(trimmed) {
        let minutes: f64 = caps[1]
            .parse()
            .map_err(|_| CodecError::Parse(value.to_string()))?;
        let seconds: f64 = caps[2]
            .parse()
            .map_err(|_| CodecError::Parse(value.to_string()))?;
        return Ok(minutes * 60.0 + seconds);
    }

    if seconds_pattern().is_match(trimmed) {
        return trimmed
            .parse::<f64>()
            .map_err(|_| CodecError::Parse(value.to_string()));
    }

    Err(CodecError::Parse(value.to_string()))
}

/// Convert every element, stopping at the first one that fails
pub fn to_seconds_batch<S: AsRef<str>>(values: &[S]) -> CodecResult<Vec<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            to_seconds(value.as_ref()).map_err(|_| CodecError::BatchElement {
                index,
                value: value.as_ref().to_string(),
            })
        })
        .collect()
}

/// Format seconds as `M:SS.S`
///
/// Minutes are unbounded (no hour rollover). Seconds are rounded to one
/// decimal with ties going to even, and a value that rounds up to a whole
/// minute carries over (`59.96` becomes `1:00.0`).
pub fn to_clock(seconds: f64) -> CodecResult<String> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(CodecError::NotClockable(seconds));
    }

    let tenths = (seconds * 10.0).round_ties_even();
    if tenths >= u64::MAX as f64 {
        return Err(CodecError::NotClockable(seconds));
    }
    let tenths = tenths as u64;
    let minutes = tenths / 600;
    let rem = tenths % 600;

    Ok(format!("{}:{:02}.{}", minutes, rem / 10, rem % 10))
}

/// Format every element with [`to_clock`]
pub fn to_clock_batch(values: &[f64]) -> CodecResult<Vec<String>> {
    values.iter().map(|&s| to_clock(s)).collect()
}

/// How times are written on axes and in listings
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimeFormat {
    /// `M:SS.S`
    #[default]
    Clock,
    /// Plain seconds, two decimals
    Seconds,
}

impl TimeFormat {
    /// Format a time for display
    ///
    /// Clock formatting falls back to seconds for negative values, which the
    /// clock form cannot express.
    pub fn format(&self, seconds: f64) -> String {
        match self {
            TimeFormat::Clock => to_clock(seconds).unwrap_or_else(|_| format!("{:.2}", seconds)),
            TimeFormat::Seconds => format!("{:.2}", seconds),
        }
    }

    /// Axis title matching this format
    pub fn axis_title(&self) -> &'static str {
        match self {
            TimeFormat::Clock => "Time (MM:SS.S)",
            TimeFormat::Seconds => "Time (SS.SS)",
        }
    }
}

impl std::str::FromStr for TimeFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clock" | "min" | "minutes" => Ok(TimeFormat::Clock),
            "seconds" | "sec" | "s" => Ok(TimeFormat::Seconds),
            other => Err(format!("unknown time format '{}'", other)),
        }
    }
}

/// One time argument, numeric already or still in text form
#[derive(Debug, Clone, PartialEq)]
pub enum TimeValue {
    Seconds(f64),
    Text(String),
}

impl TimeValue {
    /// Resolve to seconds
    pub fn to_seconds(&self) -> CodecResult<f64> {
        match self {
            TimeValue::Seconds(s) if s.is_finite() => Ok(*s),
            TimeValue::Seconds(s) => Err(CodecError::Parse(s.to_string())),
            TimeValue::Text(text) => to_seconds(text),
        }
    }
}

impl From<f64> for TimeValue {
    fn from(value: f64) -> Self {
        TimeValue::Seconds(value)
    }
}

impl From<&str> for TimeValue {
    fn from(value: &str) -> Self {
        TimeValue::Text(value.to_string())
    }
}

impl From<String> for TimeValue {
    fn from(value: String) -> Self {
        TimeValue::Text(value)
    }
}

impl std::fmt::Display for TimeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeValue::Seconds(s) => write!(f, "{}", s),
            TimeValue::Text(t) => write!(f, "{}", t),
        }
    }
}
