// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Date/time decoding.
//!
//! OPC UA encodes a DateTime as the number of 100 ns ticks since
//! 1601-01-01 00:00:00 UTC. [`DateTimeParts`] splits either that raw form
//! or a decoded `chrono` timestamp into calendar fields.

use std::fmt;

use chrono::{DateTime, Datelike, Timelike, Utc};

/// Ticks between 1601-01-01 and 1970-01-01.
pub const UA_TICKS_TO_UNIX_EPOCH: i64 = 116_444_736_000_000_000;

/// Ticks per second.
pub const UA_TICKS_PER_SECOND: i64 = 10_000_000;

/// Calendar fields of a UTC timestamp, to millisecond precision.
///
/// Displays as `DD-MM-YYYY hh:mm:ss.mmm`.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use ualoop_opcua::client::DateTimeParts;
///
/// let ts = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 2).unwrap();
/// assert_eq!(DateTimeParts::from_datetime(&ts).to_string(), "09-03-2024 07:05:02.000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateTimeParts {
    /// Year.
    pub year: i32,
    /// Month, 1-12.
    pub month: u32,
    /// Day of month, 1-31.
    pub day: u32,
    /// Hour, 0-23.
    pub hour: u32,
    /// Minute, 0-59.
    pub minute: u32,
    /// Second, 0-59.
    pub second: u32,
    /// Millisecond, 0-999.
    pub millisecond: u32,
}

impl DateTimeParts {
    /// Splits a UTC timestamp into calendar fields.
    pub fn from_datetime(value: &DateTime<Utc>) -> Self {
        Self {
            year: value.year(),
            month: value.month(),
            day: value.day(),
            hour: value.hour(),
            minute: value.minute(),
            second: value.second(),
            // leap second
            millisecond: (value.timestamp_subsec_millis()).min(999),
        }
    }

    /// Decodes a raw OPC UA DateTime.
    ///
    /// Returns `None` if the value is outside the range `chrono` can
    /// represent.
    pub fn from_ua_ticks(ticks: i64) -> Option<Self> {
        ua_ticks_to_datetime(ticks).map(|value| Self::from_datetime(&value))
    }
}

impl From<DateTime<Utc>> for DateTimeParts {
    fn from(value: DateTime<Utc>) -> Self {
        Self::from_datetime(&value)
    }
}

impl fmt::Display for DateTimeParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}-{:02}-{:04} {:02}:{:02}:{:02}.{:03}",
            self.day, self.month, self.year, self.hour, self.minute, self.second, self.millisecond
        )
    }
}

/// Converts a raw OPC UA DateTime into a `chrono` timestamp.
pub fn ua_ticks_to_datetime(ticks: i64) -> Option<DateTime<Utc>> {
    let since_unix = ticks.checked_sub(UA_TICKS_TO_UNIX_EPOCH)?;
    let secs = since_unix.div_euclid(UA_TICKS_PER_SECOND);
    let nanos = since_unix.rem_euclid(UA_TICKS_PER_SECOND) * 100;
    DateTime::<Utc>::from_timestamp(secs, nanos as u32)
}

/// Converts a `chrono` timestamp into a raw OPC UA DateTime.
pub fn datetime_to_ua_ticks(value: &DateTime<Utc>) -> i64 {
    value.timestamp() * UA_TICKS_PER_SECOND
        + i64::from(value.timestamp_subsec_nanos() / 100)
        + UA_TICKS_TO_UNIX_EPOCH
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_from_datetime() {
        let ts = Utc
            .with_ymd_and_hms(2023, 12, 31, 23, 59, 58)
            .unwrap()
            .checked_add_signed(chrono::Duration::milliseconds(123))
            .unwrap();
        let parts = DateTimeParts::from_datetime(&ts);
        assert_eq!(
            parts,
            DateTimeParts {
                year: 2023,
                month: 12,
                day: 31,
                hour: 23,
                minute: 59,
                second: 58,
                millisecond: 123,
            }
        );
        assert_eq!(parts.to_string(), "31-12-2023 23:59:58.123");
    }

    #[test]
    fn test_from_ua_ticks() {
        let parts = DateTimeParts::from_ua_ticks(UA_TICKS_TO_UNIX_EPOCH).unwrap();
        assert_eq!(parts.to_string(), "01-01-1970 00:00:00.000");

        let parts = DateTimeParts::from_ua_ticks(0).unwrap();
        assert_eq!(parts.year, 1601);
        assert_eq!((parts.month, parts.day), (1, 1));

        // 1.5 s after the Unix epoch
        let parts = DateTimeParts::from_ua_ticks(UA_TICKS_TO_UNIX_EPOCH + 15_000_000).unwrap();
        assert_eq!((parts.second, parts.millisecond), (1, 500));

        assert!(DateTimeParts::from_ua_ticks(i64::MIN).is_none());
    }

    #[test]
    fn test_ticks_conversion_is_consistent() {
        let ts = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let ticks = datetime_to_ua_ticks(&ts);
        assert_eq!(ua_ticks_to_datetime(ticks), Some(ts));
    }
}
