//! Clock and calendar helpers.
//!
//! All timestamps in the engine are epoch milliseconds (`i64`). Anything
//! that depends on the local wall clock (minutes since midnight, day keys,
//! "today at 09:00") goes through a [`Calendar`], which is either the host's
//! local zone or a fixed UTC offset. Tests pin a fixed offset so results do
//! not depend on the machine running them.

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use std::fmt;
use std::str::FromStr;

/// Epoch milliseconds.
pub type EpochMs = i64;

pub const MINUTE_MS: i64 = 60_000;
pub const DAY_MINUTES: u32 = 24 * 60;

/// A wall-clock time of day with minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u32);

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime(0);

    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self(hour * 60 + minute))
        } else {
            None
        }
    }

    /// Wraps into a single day, so 1500 becomes 01:00.
    pub const fn from_minutes(minutes: u32) -> Self {
        Self(minutes % DAY_MINUTES)
    }

    /// Parse `"H:MM"` or `"HH:MM"`. Anything else is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        let (h, m) = value.trim().split_once(':')?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return None;
        }
        let hour = h.parse::<u32>().ok()?;
        let minute = m.parse::<u32>().ok()?;
        Self::new(hour, minute)
    }

    /// Parse, falling back to `fallback` for malformed input.
    pub fn parse_or(value: &str, fallback: ClockTime) -> Self {
        Self::parse(value).unwrap_or(fallback)
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn hour(self) -> u32 {
        self.0 / 60
    }

    pub fn minute(self) -> u32 {
        self.0 % 60
    }

    fn naive(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0).unwrap_or_default()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid clock time '{s}', expected HH:MM"))
    }
}

/// Whether `now` lies in `[start, end]` (inclusive), in minutes since
/// midnight. A window whose start is after its end wraps past midnight.
pub fn in_clock_window(now: u32, start: u32, end: u32) -> bool {
    if start <= end {
        now >= start && now <= end
    } else {
        now >= start || now <= end
    }
}

/// Converts between epoch milliseconds and local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Calendar {
    /// The host's local time zone.
    #[default]
    Local,
    /// A fixed offset from UTC.
    Fixed(FixedOffset),
}

impl Calendar {
    pub fn utc() -> Self {
        Self::from_offset_minutes(0)
    }

    /// Fixed offset in minutes east of UTC. Out-of-range offsets fall back to UTC.
    pub fn from_offset_minutes(minutes: i32) -> Self {
        let offset = FixedOffset::east_opt(minutes.saturating_mul(60))
            .or_else(|| FixedOffset::east_opt(0))
            .map(Calendar::Fixed);
        offset.unwrap_or(Calendar::Local)
    }

    /// Local wall-clock time for an epoch timestamp.
    pub fn local_datetime(&self, at: EpochMs) -> NaiveDateTime {
        let utc = DateTime::<Utc>::from_timestamp_millis(at).unwrap_or_default();
        match self {
            Calendar::Local => utc.with_timezone(&Local).naive_local(),
            Calendar::Fixed(offset) => utc.with_timezone(offset).naive_local(),
        }
    }

    /// Epoch timestamp for a local wall-clock time. Times that do not exist
    /// locally (DST gaps) resolve to the first valid instant after the gap.
    pub fn to_epoch(&self, local: NaiveDateTime) -> EpochMs {
        let resolved = match self {
            Calendar::Local => Local
                .from_local_datetime(&local)
                .earliest()
                .or_else(|| Local.from_local_datetime(&(local + Duration::hours(1))).earliest())
                .map(|dt| dt.timestamp_millis()),
            Calendar::Fixed(offset) => offset
                .from_local_datetime(&local)
                .earliest()
                .map(|dt| dt.timestamp_millis()),
        };
        resolved.unwrap_or_else(|| local.and_utc().timestamp_millis())
    }

    pub fn local_date(&self, at: EpochMs) -> NaiveDate {
        self.local_datetime(at).date()
    }

    pub fn minutes_since_midnight(&self, at: EpochMs) -> u32 {
        let local = self.local_datetime(at);
        local.hour() * 60 + local.minute()
    }

    /// `YYYY-MM-DD` for the local day containing `at`.
    pub fn day_key(&self, at: EpochMs) -> String {
        self.local_date(at).format("%Y-%m-%d").to_string()
    }

    /// Day key `days` away from the local day containing `at`.
    pub fn day_key_offset(&self, at: EpochMs, days: i64) -> String {
        let date = self.local_date(at) + Duration::days(days);
        date.format("%Y-%m-%d").to_string()
    }

    /// Epoch timestamp of `time` on a given local date.
    pub fn at_clock(&self, date: NaiveDate, time: ClockTime) -> EpochMs {
        self.to_epoch(date.and_time(time.naive()))
    }

    /// Epoch timestamp of `time` on the local day containing `now`.
    pub fn today_at(&self, now: EpochMs, time: ClockTime) -> EpochMs {
        self.at_clock(self.local_date(now), time)
    }

    /// The first occurrence of `time` at or after `now`.
    pub fn next_occurrence(&self, now: EpochMs, time: ClockTime) -> EpochMs {
        let today = self.today_at(now, time);
        if today >= now {
            today
        } else {
            self.at_clock(self.local_date(now) + Duration::days(1), time)
        }
    }

    /// The last occurrence of `time` at or before `now`.
    pub fn last_occurrence(&self, now: EpochMs, time: ClockTime) -> EpochMs {
        let today = self.today_at(now, time);
        if today <= now {
            today
        } else {
            self.at_clock(self.local_date(now) - Duration::days(1), time)
        }
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> EpochMs {
    Utc::now().timestamp_millis()
}
