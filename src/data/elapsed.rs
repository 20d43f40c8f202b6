//! Elapsed race time parsing and tick conversion
//!
//! DotTrack reports a team's race time as an `H:MM:SS` string. The replay is
//! sampled at a fixed interval, so a team's elapsed time tells us how many
//! replay ticks its track should span.

use chrono::Duration;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Default replay sampling interval in seconds
pub const DEFAULT_TICK_SECONDS: u64 = 120;

/// Matches the leading `H:MM:SS` of an elapsed string. Hours are unbounded.
static ELAPSED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<hours>[0-9]+):(?P<minutes>[0-9]+):(?P<seconds>[0-9]+)")
        .expect("Invalid elapsed pattern")
});

/// Errors that can occur when parsing an elapsed time string
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ElapsedError {
    /// The string does not start with `H:MM:SS`
    #[error("Malformed elapsed time: '{0}' (expected H:MM:SS)")]
    Malformed(String),

    /// The components are too large to represent as a duration
    #[error("Elapsed time out of range: '{0}'")]
    OutOfRange(String),
}

/// A parsed elapsed race time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Elapsed {
    total: Duration,
    whole_minutes: Duration,
}

impl Elapsed {
    /// Parses an elapsed string such as `"1:02:30"`
    ///
    /// Only the leading `H:MM:SS` has to match; anything after the seconds
    /// group is ignored.
    pub fn parse(s: &str) -> Result<Self, ElapsedError> {
        let caps = ELAPSED_PATTERN
            .captures(s)
            .ok_or_else(|| ElapsedError::Malformed(s.to_string()))?;

        let out_of_range = || ElapsedError::OutOfRange(s.to_string());
        let field = |name: &str| -> Result<i64, ElapsedError> {
            caps[name].parse::<i64>().map_err(|_| out_of_range())
        };

        let hours = field("hours")?;
        let minutes = field("minutes")?;
        let seconds = field("seconds")?;

        let minute_secs = hours
            .checked_mul(3600)
            .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
            .ok_or_else(out_of_range)?;
        let total_secs = minute_secs.checked_add(seconds).ok_or_else(out_of_range)?;

        Ok(Self {
            total: Duration::try_seconds(total_secs).ok_or_else(out_of_range)?,
            whole_minutes: Duration::try_seconds(minute_secs).ok_or_else(out_of_range)?,
        })
    }

    /// Full elapsed time, seconds included
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Number of replay ticks covered by this elapsed time
    ///
    /// Only whole minutes count: the seconds component is dropped before
    /// dividing, and the division truncates.
    pub fn ticks(&self, tick_seconds: u64) -> u64 {
        let secs = self.whole_minutes.num_seconds().max(0) as u64;
        secs / tick_seconds.max(1)
    }
}

/// Parses an elapsed string straight into a tick count
pub fn parse_elapsed_ticks(s: &str, tick_seconds: u64) -> Result<u64, ElapsedError> {
    Elapsed::parse(s).map(|e| e.ticks(tick_seconds))
}
