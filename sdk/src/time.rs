//! # Timestamps & Durations
//!
//! Two millisecond-resolution value types that show up in every deploy
//! header and transaction payload:
//!
//! - [`Timestamp`]: milliseconds since the Unix epoch. JSON form is RFC 3339
//!   with millisecond precision (`2024-01-01T00:00:00.000Z`).
//! - [`TimeDiff`]: a TTL in milliseconds. JSON form is the humantime style
//!   nodes print: `30m`, `1h 30m`, `1day`, `500ms`.
//!
//! On the wire both are a plain `u64` LE.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::bytesrepr::{self, FromBytes, ToBytes, U64_SERIALIZED_LENGTH};

const MILLIS_PER_SECOND: u64 = 1_000;
const MILLIS_PER_MINUTE: u64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: u64 = 60 * MILLIS_PER_MINUTE;
const MILLIS_PER_DAY: u64 = 24 * MILLIS_PER_HOUR;

/// Errors from parsing a [`Timestamp`] or [`TimeDiff`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    /// The text is not a valid RFC 3339 date-time.
    #[error("invalid RFC 3339 timestamp: {0}")]
    Rfc3339(String),

    /// The date-time lies before the Unix epoch.
    #[error("timestamp precedes the Unix epoch")]
    BeforeEpoch,

    /// A duration component has no recognised unit.
    #[error("unknown duration unit: {0:?}")]
    UnknownUnit(String),

    /// A duration component has no leading number.
    #[error("expected a number in duration: {0:?}")]
    MissingNumber(String),

    /// The duration was empty.
    #[error("empty duration")]
    Empty,

    /// The duration does not fit in 64 bits of milliseconds.
    #[error("duration overflows u64 milliseconds")]
    Overflow,
}

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The current wall-clock time.
    pub fn now() -> Self {
        Timestamp(u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0))
    }

    /// Wraps a raw millisecond count.
    pub const fn from_millis(millis: u64) -> Self {
        Timestamp(millis)
    }

    /// The raw millisecond count.
    pub const fn millis(&self) -> u64 {
        self.0
    }

    /// `self + diff`, saturating at `u64::MAX`.
    pub fn saturating_add(self, diff: TimeDiff) -> Self {
        Timestamp(self.0.saturating_add(diff.millis()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = i64::try_from(self.0)
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true));
        match rendered {
            Some(text) => f.write_str(&text),
            // Beyond chrono's calendar range. Fall back to the raw count,
            // which `from_str` reads back.
            None => write!(f, "{}ms", self.0),
        }
    }
}

impl FromStr for Timestamp {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(digits) = s.strip_suffix("ms") {
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                return digits.parse().map(Timestamp).map_err(|_| TimeParseError::Overflow);
            }
        }
        let parsed = DateTime::parse_from_rfc3339(s)
            .map_err(|e| TimeParseError::Rfc3339(e.to_string()))?;
        u64::try_from(parsed.timestamp_millis())
            .map(Timestamp)
            .map_err(|_| TimeParseError::BeforeEpoch)
    }
}

impl From<u64> for Timestamp {
    fn from(millis: u64) -> Self {
        Timestamp(millis)
    }
}

impl ToBytes for Timestamp {
    fn serialized_length(&self) -> usize {
        U64_SERIALIZED_LENGTH
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        self.0.write_bytes(writer)
    }
}

impl FromBytes for Timestamp {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (millis, rem) = u64::from_bytes(bytes)?;
        Ok((Timestamp(millis), rem))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// TimeDiff
// ---------------------------------------------------------------------------

/// A span of time in milliseconds, used for TTLs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeDiff(u64);

impl TimeDiff {
    /// Wraps a raw millisecond count.
    pub const fn from_millis(millis: u64) -> Self {
        TimeDiff(millis)
    }

    /// Whole seconds.
    pub const fn from_seconds(seconds: u64) -> Self {
        TimeDiff(seconds * MILLIS_PER_SECOND)
    }

    /// Whole minutes.
    pub const fn from_minutes(minutes: u64) -> Self {
        TimeDiff(minutes * MILLIS_PER_MINUTE)
    }

    /// The raw millisecond count.
    pub const fn millis(&self) -> u64 {
        self.0
    }
}

fn unit_millis(unit: &str) -> Option<u64> {
    let millis = match unit {
        "ms" | "msec" | "millis" => 1,
        "s" | "sec" | "secs" | "second" | "seconds" => MILLIS_PER_SECOND,
        "m" | "min" | "mins" | "minute" | "minutes" => MILLIS_PER_MINUTE,
        "h" | "hr" | "hrs" | "hour" | "hours" => MILLIS_PER_HOUR,
        "d" | "day" | "days" => MILLIS_PER_DAY,
        _ => return None,
    };
    Some(millis)
}

impl fmt::Display for TimeDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("0s");
        }
        let mut rest = self.0;
        let mut parts = Vec::with_capacity(5);

        let days = rest / MILLIS_PER_DAY;
        rest %= MILLIS_PER_DAY;
        match days {
            0 => {}
            1 => parts.push("1day".to_string()),
            n => parts.push(format!("{n}days")),
        }
        for (unit, size) in [
            ("h", MILLIS_PER_HOUR),
            ("m", MILLIS_PER_MINUTE),
            ("s", MILLIS_PER_SECOND),
            ("ms", 1),
        ] {
            let count = rest / size;
            rest %= size;
            if count > 0 {
                parts.push(format!("{count}{unit}"));
            }
        }
        f.write_str(&parts.join(" "))
    }
}

impl FromStr for TimeDiff {
    type Err = TimeParseError;

    /// Accepts whitespace-separated `<number><unit>` components, e.g.
    /// `1h 30m` or `1day`. Components may also be run together (`1h30m`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TimeParseError::Empty);
        }

        let mut total: u64 = 0;
        let mut chars = s.char_indices().peekable();
        while let Some(&(start, c)) = chars.peek() {
            if c.is_whitespace() {
                chars.next();
                continue;
            }
            let mut digits_end = start;
            while let Some(&(i, c)) = chars.peek() {
                if !c.is_ascii_digit() {
                    break;
                }
                digits_end = i + c.len_utf8();
                chars.next();
            }
            if digits_end == start {
                return Err(TimeParseError::MissingNumber(s[start..].to_string()));
            }
            let mut unit_end = digits_end;
            while let Some(&(i, c)) = chars.peek() {
                if !c.is_ascii_alphabetic() {
                    break;
                }
                unit_end = i + c.len_utf8();
                chars.next();
            }

            let count: u64 = s[start..digits_end]
                .parse()
                .map_err(|_| TimeParseError::Overflow)?;
            let unit = &s[digits_end..unit_end];
            let size =
                unit_millis(unit).ok_or_else(|| TimeParseError::UnknownUnit(unit.to_string()))?;
            total = count
                .checked_mul(size)
                .and_then(|millis| total.checked_add(millis))
                .ok_or(TimeParseError::Overflow)?;
        }
        Ok(TimeDiff(total))
    }
}

impl From<u64> for TimeDiff {
    fn from(millis: u64) -> Self {
        TimeDiff(millis)
    }
}

impl ToBytes for TimeDiff {
    fn serialized_length(&self) -> usize {
        U64_SERIALIZED_LENGTH
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        self.0.write_bytes(writer)
    }
}

impl FromBytes for TimeDiff {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (millis, rem) = u64::from_bytes(bytes)?;
        Ok((TimeDiff(millis), rem))
    }
}

impl Serialize for TimeDiff {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeDiff {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_rfc3339_with_millis() {
        let ts = Timestamp::from_millis(1_704_067_200_123);
        assert_eq!(ts.to_string(), "2024-01-01T00:00:00.123Z");
        assert_eq!("2024-01-01T00:00:00.123Z".parse::<Timestamp>().unwrap(), ts);
    }

    #[test]
    fn timestamp_epoch_and_zero_millis() {
        assert_eq!(Timestamp::from_millis(0).to_string(), "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn timestamp_before_epoch_rejected() {
        assert_eq!(
            "1969-12-31T23:59:59.000Z".parse::<Timestamp>(),
            Err(TimeParseError::BeforeEpoch)
        );
    }

    #[test]
    fn timestamp_json() {
        let ts = Timestamp::from_millis(1_704_067_200_000);
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2024-01-01T00:00:00.000Z\"");
        assert_eq!(serde_json::from_str::<Timestamp>(&json).unwrap(), ts);
    }

    #[test]
    fn timestamp_beyond_calendar_range_roundtrips() {
        for millis in [u64::MAX, 9_000_000_000_000_000] {
            let ts = Timestamp::from_millis(millis);
            assert_eq!(ts.to_string(), format!("{millis}ms"));
            let json = serde_json::to_string(&ts).unwrap();
            assert_eq!(serde_json::from_str::<Timestamp>(&json).unwrap(), ts);
        }
        let expiry = Timestamp::from_millis(u64::MAX - 1).saturating_add(TimeDiff::from_minutes(30));
        assert_eq!(expiry.to_string().parse::<Timestamp>().unwrap(), expiry);

        assert_eq!(
            "18446744073709551616ms".parse::<Timestamp>(),
            Err(TimeParseError::Overflow)
        );
        assert!("ms".parse::<Timestamp>().is_err());
        assert!("12x4ms".parse::<Timestamp>().is_err());
    }

    #[test]
    fn timediff_display() {
        assert_eq!(TimeDiff::from_minutes(30).to_string(), "30m");
        assert_eq!(TimeDiff::from_minutes(90).to_string(), "1h 30m");
        assert_eq!(TimeDiff::from_millis(MILLIS_PER_DAY).to_string(), "1day");
        assert_eq!(TimeDiff::from_millis(2 * MILLIS_PER_DAY).to_string(), "2days");
        assert_eq!(TimeDiff::from_millis(500).to_string(), "500ms");
        assert_eq!(TimeDiff::from_millis(0).to_string(), "0s");
    }

    #[test]
    fn timediff_parse() {
        assert_eq!("30m".parse::<TimeDiff>().unwrap(), TimeDiff::from_minutes(30));
        assert_eq!("1h 30m".parse::<TimeDiff>().unwrap(), TimeDiff::from_minutes(90));
        assert_eq!("1h30m".parse::<TimeDiff>().unwrap(), TimeDiff::from_minutes(90));
        assert_eq!("1day".parse::<TimeDiff>().unwrap().millis(), MILLIS_PER_DAY);
        assert_eq!("500ms".parse::<TimeDiff>().unwrap().millis(), 500);
    }

    #[test]
    fn timediff_parse_errors() {
        assert_eq!("".parse::<TimeDiff>(), Err(TimeParseError::Empty));
        assert_eq!(
            "fortnight".parse::<TimeDiff>(),
            Err(TimeParseError::MissingNumber("fortnight".into()))
        );
        assert_eq!(
            "5y".parse::<TimeDiff>(),
            Err(TimeParseError::UnknownUnit("y".into()))
        );
        assert_eq!(
            "99999999999999999999d".parse::<TimeDiff>(),
            Err(TimeParseError::Overflow)
        );
    }

    #[test]
    fn timediff_display_parse_agree() {
        for millis in [1, 999, 61_000, 3_600_000, 86_400_001, 90_061_001] {
            let diff = TimeDiff::from_millis(millis);
            assert_eq!(diff.to_string().parse::<TimeDiff>().unwrap(), diff);
        }
    }

    #[test]
    fn wire_form_is_u64_le() {
        let ts = Timestamp::from_millis(1);
        assert_eq!(ts.to_bytes().unwrap(), vec![1, 0, 0, 0, 0, 0, 0, 0]);
        let diff: TimeDiff = bytesrepr::deserialize(&[2, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(diff.millis(), 2);
    }
}
