//! Wall-clock time of day, as printed on a duty log.

use std::fmt;
use std::str::FromStr;

use jiff::SignedDuration;
use jiff::civil::Time;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A time of day, serialized as `HH:MM`.
///
/// Offsets wrap at midnight the way a wall clock does. Seconds are kept so
/// fractional driving segments add up exactly, but are dropped on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(Time);

/// A string that isn't a valid `HH:MM` time.
#[derive(Debug, thiserror::Error)]
#[error("invalid clock time '{0}': expected HH:MM")]
pub struct ParseClockError(String);

impl ClockTime {
    /// Builds a time from hour and minute. Panics on out-of-range constants.
    pub const fn from_hm(hour: i8, minute: i8) -> Self {
        Self(Time::constant(hour, minute, 0, 0))
    }

    /// The time `hours` later, wrapping past midnight.
    ///
    /// Rounded to the nearest second.
    #[must_use]
    pub fn after_hours(self, hours: f64) -> Self {
        let seconds = (hours * 3600.0).round() as i64;
        Self(self.0.wrapping_add(SignedDuration::from_secs(seconds)))
    }

    /// Hours from `earlier` to `self`, assuming less than a day passed.
    pub fn hours_since(self, earlier: Self) -> f64 {
        let mut seconds = self.0.duration_since(earlier.0).as_secs_f64();
        if seconds < 0.0 {
            seconds += SECONDS_PER_DAY;
        }
        seconds / 3600.0
    }

    /// Whole minutes since midnight; seconds are truncated.
    pub fn minutes_since_midnight(self) -> u32 {
        u32::from(self.0.hour().unsigned_abs()) * 60 + u32::from(self.0.minute().unsigned_abs())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

impl FromStr for ClockTime {
    type Err = ParseClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseClockError(s.to_string());
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour: i8 = hour.parse().map_err(|_| invalid())?;
        let minute: i8 = minute.parse().map_err(|_| invalid())?;
        Time::new(hour, minute, 0, 0).map(Self).map_err(|_| invalid())
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_as_hours_and_minutes() {
        assert_eq!(ClockTime::from_hm(6, 0).to_string(), "06:00");
        assert_eq!(ClockTime::from_hm(18, 45).to_string(), "18:45");
    }

    #[test]
    fn fractional_hours_round_to_the_second() {
        let start = ClockTime::from_hm(7, 0);
        assert_eq!(start.after_hours(0.3).to_string(), "07:18");
        assert_eq!(start.after_hours(0.25).to_string(), "07:15");
    }

    #[test]
    fn wraps_past_midnight() {
        let rest_start = ClockTime::from_hm(18, 30);
        let rest_end = rest_start.after_hours(10.0);
        assert_eq!(rest_end.to_string(), "04:30");
        assert!((rest_end.hours_since(rest_start) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn hours_since_same_time_is_zero() {
        let t = ClockTime::from_hm(9, 0);
        assert!(t.hours_since(t).abs() < 1e-12);
    }

    #[test]
    fn minutes_since_midnight_truncates_seconds() {
        let t = ClockTime::from_hm(6, 0).after_hours(0.123);
        assert_eq!(t.to_string(), "06:07");
        assert_eq!(t.minutes_since_midnight(), 6 * 60 + 7);
    }

    #[test]
    fn parses_hh_mm() {
        let t: ClockTime = "06:30".parse().unwrap();
        assert_eq!(t, ClockTime::from_hm(6, 30));
        assert!("6".parse::<ClockTime>().is_err());
        assert!("25:00".parse::<ClockTime>().is_err());
        assert!("ab:cd".parse::<ClockTime>().is_err());
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&ClockTime::from_hm(7, 5)).unwrap();
        assert_eq!(json, "\"07:05\"");
        let back: ClockTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ClockTime::from_hm(7, 5));
    }
}
