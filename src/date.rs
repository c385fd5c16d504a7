use crate::error::AnalysisError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, UtcOffset};

/// Calendar day ("YYYY-MM-DD") used as the bucket key. Ordering is chronological.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Day(Date);

impl Day {
    pub fn new(year: i32, month: u8, day: u8) -> Result<Self, AnalysisError> {
        let bad = || AnalysisError::InvalidDate(format!("{:04}-{:02}-{:02}", year, month, day));
        let month = Month::try_from(month).map_err(|_| bad())?;
        Date::from_calendar_date(year, month, day).map(Day).map_err(|_| bad())
    }

    pub fn date(self) -> Date {
        self.0
    }

    /// Whole days from `earlier` to `self` (negative if `self` comes first).
    pub fn days_since(self, earlier: Day) -> i64 {
        (self.0 - earlier.0).whole_days()
    }
}

impl From<Date> for Day {
    fn from(d: Date) -> Self {
        Day(d)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.0.year(), self.0.month() as u8, self.0.day())
    }
}

impl FromStr for Day {
    type Err = AnalysisError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fmt = format_description!("[year]-[month]-[day]");
        Date::parse(s.trim(), &fmt)
            .map(Day)
            .map_err(|_| AnalysisError::InvalidDate(s.to_string()))
    }
}

impl Serialize for Day {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Day {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Time zone used to turn an epoch timestamp into a calendar day.
/// Host-local time is never consulted; UTC unless a fixed offset is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DayPolicy {
    #[default]
    Utc,
    FixedOffset(UtcOffset),
}

impl DayPolicy {
    pub fn day_of(&self, epoch_secs: i64) -> Result<Day, AnalysisError> {
        let dt = OffsetDateTime::from_unix_timestamp(epoch_secs)
            .map_err(|_| AnalysisError::TimestampOutOfRange(epoch_secs))?;
        let dt = match self {
            DayPolicy::Utc => dt,
            DayPolicy::FixedOffset(off) => dt.to_offset(*off),
        };
        Ok(Day(dt.date()))
    }
}

impl fmt::Display for DayPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayPolicy::Utc => write!(f, "UTC"),
            DayPolicy::FixedOffset(off) => {
                let (h, m, _) = off.as_hms();
                let sign = if off.is_negative() { '-' } else { '+' };
                write!(f, "{}{:02}:{:02}", sign, h.unsigned_abs(), m.unsigned_abs())
            }
        }
    }
}

impl FromStr for DayPolicy {
    type Err = String;
    /// Accepts "UTC", "Z", or a fixed offset "+HH:MM" / "-HH:MM".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("utc") || s == "Z" {
            return Ok(DayPolicy::Utc);
        }
        let (sign, rest) = match s.chars().next() {
            Some('+') => (1i8, &s[1..]),
            Some('-') => (-1i8, &s[1..]),
            _ => return Err("expected UTC or +HH:MM / -HH:MM".into()),
        };
        let parts: Vec<_> = rest.split(':').collect();
        if parts.len() != 2 {
            return Err("expected +HH:MM / -HH:MM".into());
        }
        let hours: i8 = parts[0].parse().map_err(|_| "invalid offset hours")?;
        let minutes: i8 = parts[1].parse().map_err(|_| "invalid offset minutes")?;
        if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
            return Err("offset out of range".into());
        }
        let off = UtcOffset::from_hms(sign * hours, sign * minutes, 0).map_err(|e| e.to_string())?;
        if off.is_utc() {
            Ok(DayPolicy::Utc)
        } else {
            Ok(DayPolicy::FixedOffset(off))
        }
    }
}
