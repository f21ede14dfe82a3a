//! Search time budgeting.
//!
//! Turns a duration string such as `"250ms"` into a `Duration` and wraps the
//! resulting wall-clock deadline in a value the search can poll cheaply.

use std::time::{Duration, Instant};

use thiserror::Error;

/// Nodes expanded between two deadline polls.
pub const NODE_POLL_INTERVAL: u64 = 256;

/// Documented bound on how far a search may run past its budget once the
/// protected depth-1 iteration is complete.
pub const DEADLINE_OVERSHOOT_MARGIN: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationParseError {
    #[error("duration is empty")]
    Empty,
    #[error("duration has no magnitude before the unit")]
    MissingMagnitude,
    #[error("duration must not be negative")]
    Negative,
    #[error("duration magnitude is not a non-negative integer: {0}")]
    InvalidMagnitude(String),
    #[error("duration has no unit (expected us, ms or s)")]
    MissingUnit,
    #[error("unknown duration unit: {0}")]
    UnknownUnit(String),
    #[error("duration magnitude does not fit in 64 bits")]
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DurationUnit {
    Microseconds,
    Milliseconds,
    Seconds,
}

impl DurationUnit {
    fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "us" | "microsecond" | "microseconds" => Some(Self::Microseconds),
            "ms" | "millisecond" | "milliseconds" => Some(Self::Milliseconds),
            "s" | "sec" | "secs" | "second" | "seconds" => Some(Self::Seconds),
            _ => None,
        }
    }

    fn to_duration(self, magnitude: u64) -> Duration {
        match self {
            Self::Microseconds => Duration::from_micros(magnitude),
            Self::Milliseconds => Duration::from_millis(magnitude),
            Self::Seconds => Duration::from_secs(magnitude),
        }
    }
}

/// Parse `<digits><optional whitespace><unit>`, e.g. `100microseconds`,
/// `250 ms` or `2s`.
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(DurationParseError::Empty);
    }
    if text.starts_with('-') {
        return Err(DurationParseError::Negative);
    }

    let digits_end = text
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(text.len(), |(idx, _)| idx);
    let (digits, rest) = text.split_at(digits_end);

    if digits.is_empty() {
        return Err(if rest.starts_with(|c: char| c.is_alphabetic()) {
            DurationParseError::MissingMagnitude
        } else {
            DurationParseError::InvalidMagnitude(text.to_owned())
        });
    }
    if rest.starts_with(['.', ',']) {
        return Err(DurationParseError::InvalidMagnitude(text.to_owned()));
    }

    let magnitude = digits
        .parse::<u64>()
        .map_err(|_| DurationParseError::Overflow)?;

    let unit_token = rest.trim_start();
    if unit_token.is_empty() {
        return Err(DurationParseError::MissingUnit);
    }
    let unit = DurationUnit::parse(unit_token)
        .ok_or_else(|| DurationParseError::UnknownUnit(unit_token.to_owned()))?;

    Ok(unit.to_duration(magnitude))
}

/// Wall-clock deadline for one search.
#[derive(Debug, Clone, Copy)]
pub struct SearchDeadline {
    started_at: Instant,
    budget: Duration,
    // `None` when `started_at + budget` is not representable.
    expires_at: Option<Instant>,
}

impl SearchDeadline {
    #[inline]
    pub fn from_now(budget: Duration) -> Self {
        deadline_from(Instant::now(), budget)
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }

    #[inline]
    pub fn remaining(&self) -> Duration {
        self.expires_at
            .map_or(Duration::MAX, |at| at.saturating_duration_since(Instant::now()))
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    #[inline]
    pub fn budget(&self) -> Duration {
        self.budget
    }

    #[inline]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }
}

#[inline]
pub fn deadline_from(now: Instant, budget: Duration) -> SearchDeadline {
    SearchDeadline {
        started_at: now,
        budget,
        expires_at: now.checked_add(budget),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_unit_spelling() {
        assert_eq!(parse_duration("100microseconds"), Ok(Duration::from_micros(100)));
        assert_eq!(parse_duration("1microsecond"), Ok(Duration::from_micros(1)));
        assert_eq!(parse_duration("7us"), Ok(Duration::from_micros(7)));
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("250 milliseconds"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("2s"), Ok(Duration::from_secs(2)));
        assert_eq!(parse_duration("3 seconds"), Ok(Duration::from_secs(3)));
        assert_eq!(parse_duration("  5sec  "), Ok(Duration::from_secs(5)));
        assert_eq!(parse_duration("0ms"), Ok(Duration::ZERO));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse_duration(""), Err(DurationParseError::Empty));
        assert_eq!(parse_duration("   "), Err(DurationParseError::Empty));
        assert_eq!(parse_duration("ms"), Err(DurationParseError::MissingMagnitude));
        assert_eq!(parse_duration("-5ms"), Err(DurationParseError::Negative));
        assert!(matches!(
            parse_duration("1.5s"),
            Err(DurationParseError::InvalidMagnitude(_))
        ));
        assert!(matches!(
            parse_duration("+5ms"),
            Err(DurationParseError::InvalidMagnitude(_))
        ));
        assert_eq!(parse_duration("100"), Err(DurationParseError::MissingUnit));
        assert_eq!(
            parse_duration("10 fortnights"),
            Err(DurationParseError::UnknownUnit("fortnights".to_owned()))
        );
        assert_eq!(
            parse_duration("99999999999999999999999ms"),
            Err(DurationParseError::Overflow)
        );
    }

    #[test]
    fn zero_budget_deadline_is_already_expired() {
        let deadline = SearchDeadline::from_now(Duration::ZERO);
        assert!(deadline.is_expired());
        assert_eq!(deadline.remaining(), Duration::ZERO);
    }

    #[test]
    fn generous_deadline_is_not_expired() {
        let now = Instant::now();
        let deadline = deadline_from(now, Duration::from_secs(60));
        assert!(!deadline.is_expired());
        assert!(deadline.remaining() > Duration::from_secs(59));
        assert_eq!(deadline.started_at(), now);
        assert_eq!(deadline.budget(), Duration::from_secs(60));
    }

    #[test]
    fn unrepresentable_deadline_never_expires() {
        let deadline = SearchDeadline::from_now(Duration::MAX);
        assert!(!deadline.is_expired());
        assert_eq!(deadline.remaining(), Duration::MAX);
    }
}
