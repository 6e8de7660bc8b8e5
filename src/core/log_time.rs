//! Calendar timestamps captured at emission time
//!
//! Records carry local wall-clock time with millisecond precision. Rotation
//! decisions and file names are derived from these calendar fields, never
//! from the clock at write time.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Timelike};
use std::fmt;

/// Local calendar time of a log event with sub-second precision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogTime {
    datetime: NaiveDateTime,
}

impl LogTime {
    /// Capture the current local time
    #[inline]
    pub fn now() -> Self {
        Self {
            datetime: Local::now().naive_local(),
        }
    }

    pub fn from_naive(datetime: NaiveDateTime) -> Self {
        Self { datetime }
    }

    /// Build a timestamp from calendar fields, `None` when they do not form
    /// a valid date and time
    ///
    /// # Examples
    ///
    /// ```
    /// use log_service::core::LogTime;
    ///
    /// let t = LogTime::from_ymd_hms_milli(2024, 1, 1, 23, 59, 59, 250).unwrap();
    /// assert_eq!(t.to_string(), "2024-01-01 23:59:59.250");
    /// assert!(LogTime::from_ymd_hms_milli(2024, 2, 30, 0, 0, 0, 0).is_none());
    /// ```
    pub fn from_ymd_hms_milli(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        millis: u32,
    ) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)?
            .and_hms_milli_opt(hour, minute, second, millis)
            .map(Self::from_naive)
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.datetime
    }

    pub fn year(&self) -> i32 {
        self.datetime.year()
    }

    pub fn month(&self) -> u32 {
        self.datetime.month()
    }

    pub fn day(&self) -> u32 {
        self.datetime.day()
    }

    pub fn hour(&self) -> u32 {
        self.datetime.hour()
    }

    /// Millisecond part, 0..=999 (leap-second nanos are clamped)
    #[inline]
    pub fn millis(&self) -> u32 {
        (self.datetime.nanosecond() / 1_000_000).min(999)
    }

    /// Whole seconds since the epoch of this calendar time, used to detect
    /// when the formatted second changes
    #[inline]
    pub fn second_key(&self) -> i64 {
        self.datetime.and_utc().timestamp()
    }

    /// `YYYY-MM-DD HH:MM:SS`, the second-resolution part of a line prefix
    pub fn format_seconds(&self) -> String {
        self.datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// `YYYYMMDD-HHMMSS`, the calendar part of a log file name
    pub fn file_stamp(&self) -> String {
        self.datetime.format("%Y%m%d-%H%M%S").to_string()
    }

    /// Same year, month and day
    pub fn same_day(&self, other: &LogTime) -> bool {
        self.year() == other.year() && self.month() == other.month() && self.day() == other.day()
    }

    /// Same year, month, day and hour
    pub fn same_hour(&self, other: &LogTime) -> bool {
        self.same_day(other) && self.hour() == other.hour()
    }
}

impl fmt::Display for LogTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}", self.datetime.format("%Y-%m-%d %H:%M:%S"), self.millis())
    }
}
