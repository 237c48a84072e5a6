//! Date and clock tokens, and their resolution to absolute instants.
//!
//! The program data never carries a year. Each row has a short `"DD.MM"`
//! date token and an `"HH:MM"` clock token; the [`ProgramCalendar`] decides
//! which calendar year a token belongs to. The rule is deliberately simple:
//! a token in the eve's month belongs to `eve_year`, every other month to the
//! year after. With the default calendar, `31.12` is 2024 and `01.01` is
//! 2025, so `01.01 00:20` sorts after `31.12 23:55`.
//!
//! Instants are naive (`chrono::NaiveDateTime`): the program runs in one
//! place, so there is no timezone to carry.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Serialize, Serializer};

use crate::error::{EngineError, Result};

/// Display format for a resolved instant: `"31.12 23:55"`.
pub const INSTANT_FORMAT: &str = "%d.%m %H:%M";

/// Display format for a clock time: `"23:55"`.
pub const TIME_FORMAT: &str = "%H:%M";

// ── Tokens ──────────────────────────────────────────────────────────────────

/// A validated `"DD.MM"` date token.
///
/// Only the shape and ranges (day 1-31, month 1-12) are checked here; whether
/// the day exists in that month depends on the year, which only a
/// [`ProgramCalendar`] knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateToken {
    day: u32,
    month: u32,
}

impl DateToken {
    pub fn new(day: u32, month: u32) -> Result<Self> {
        if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
            return Err(EngineError::MalformedTimeToken(format!(
                "'{day:02}.{month:02}': day or month out of range"
            )));
        }
        Ok(Self { day, month })
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl FromStr for DateToken {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let (day, month) = split_pair(s, '.')?;
        Self::new(day, month)
    }
}

impl fmt::Display for DateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}.{:02}", self.day, self.month)
    }
}

impl Serialize for DateToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse an `"HH:MM"` clock token.
///
/// # Errors
///
/// Returns [`EngineError::MalformedTimeToken`] unless the token is exactly two
/// integer components separated by `:` naming a valid time of day.
pub fn parse_clock_time(token: &str) -> Result<NaiveTime> {
    let (hour, minute) = split_pair(token, ':')?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
        EngineError::MalformedTimeToken(format!("'{}': not a time of day", token.trim()))
    })
}

/// Split `token` on `sep` into exactly two unsigned integers.
fn split_pair(token: &str, sep: char) -> Result<(u32, u32)> {
    let token = token.trim();
    let malformed = || {
        EngineError::MalformedTimeToken(format!(
            "'{token}': expected two integers separated by '{sep}'"
        ))
    };

    let mut parts = token.split(sep);
    let (Some(first), Some(second), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed());
    };
    let first = first.parse::<u32>().map_err(|_| malformed())?;
    let second = second.parse::<u32>().map_err(|_| malformed())?;
    Ok((first, second))
}

// ── ProgramCalendar ─────────────────────────────────────────────────────────

/// The year-assignment rule for the two-day program window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramCalendar {
    eve_year: i32,
    eve: DateToken,
    next_day: DateToken,
    next_year: i32,
}

impl Default for ProgramCalendar {
    /// New Year's Eve 2024: `31.12` → 2024, `01.01` → 2025.
    fn default() -> Self {
        Self {
            eve_year: 2024,
            eve: DateToken { day: 31, month: 12 },
            next_day: DateToken { day: 1, month: 1 },
            next_year: 2025,
        }
    }
}

impl ProgramCalendar {
    /// Build a calendar whose first program day is `eve` in `eve_year`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MalformedTimeToken`] if `eve` does not exist in
    /// `eve_year` (e.g. `29.02` in a non-leap year).
    pub fn new(eve_year: i32, eve: DateToken) -> Result<Self> {
        let eve_date = NaiveDate::from_ymd_opt(eve_year, eve.month, eve.day).ok_or_else(|| {
            EngineError::MalformedTimeToken(format!("'{eve}' does not exist in {eve_year}"))
        })?;
        let next = eve_date.succ_opt().ok_or_else(|| {
            EngineError::MalformedTimeToken(format!("'{eve}' has no following day"))
        })?;
        Ok(Self {
            eve_year,
            eve,
            next_day: DateToken {
                day: next.day(),
                month: next.month(),
            },
            next_year: next.year(),
        })
    }

    /// Same rule as the default calendar, shifted to another year.
    pub fn with_eve_year(eve_year: i32) -> Self {
        Self {
            eve_year,
            next_year: eve_year.saturating_add(1),
            ..Self::default()
        }
    }

    pub fn eve_year(&self) -> i32 {
        self.eve_year
    }

    /// The first program date token.
    pub fn eve(&self) -> DateToken {
        self.eve
    }

    /// The second program date token.
    pub fn next_day(&self) -> DateToken {
        self.next_day
    }

    /// The calendar year a date token belongs to.
    ///
    /// The eve's month belongs to `eve_year` and the following day's month to
    /// the year that day actually falls in. Any other month is taken to be
    /// after the year boundary.
    pub fn year_for(&self, date: DateToken) -> i32 {
        if date.month == self.eve.month {
            self.eve_year
        } else if date.month == self.next_day.month {
            self.next_year
        } else {
            self.eve_year.saturating_add(1)
        }
    }

    /// Combine a date token and a clock time into an absolute instant.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MalformedTimeToken`] when the token names a day
    /// that does not exist in its assigned year.
    pub fn resolve(&self, date: DateToken, time: NaiveTime) -> Result<NaiveDateTime> {
        let year = self.year_for(date);
        NaiveDate::from_ymd_opt(year, date.month, date.day)
            .map(|d| d.and_time(time))
            .ok_or_else(|| {
                EngineError::MalformedTimeToken(format!("'{date}' does not exist in {year}"))
            })
    }

    /// [`resolve`](Self::resolve) from raw `"DD.MM"` / `"HH:MM"` tokens.
    pub fn resolve_tokens(&self, date_token: &str, time_token: &str) -> Result<NaiveDateTime> {
        let date = date_token.parse::<DateToken>()?;
        let time = parse_clock_time(time_token)?;
        self.resolve(date, time)
    }

    /// Map a host-clock reading onto the program window.
    ///
    /// The eve and the following day map to themselves. Any other date is
    /// clamped: a date in the eve's month becomes the eve, everything else
    /// becomes the following day. Seconds are dropped.
    pub fn moment_for(&self, now: NaiveDateTime) -> Result<ProgramMoment> {
        let today = (now.day(), now.month());
        let date = if today == (self.eve.day, self.eve.month) {
            self.eve
        } else if today == (self.next_day.day, self.next_day.month) {
            self.next_day
        } else if now.month() == self.eve.month {
            self.eve
        } else {
            self.next_day
        };

        let time = NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).ok_or_else(|| {
            EngineError::MalformedTimeToken(format!("'{}': not a time of day", now.time()))
        })?;

        Ok(ProgramMoment {
            date,
            time: time.format(TIME_FORMAT).to_string(),
            full_date: now.format("%d.%m.%Y").to_string(),
            instant: self.resolve(date, time)?,
        })
    }
}

/// A host-clock reading expressed in program terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramMoment {
    /// The program date token the reading was mapped to.
    pub date: DateToken,
    /// `"HH:MM"` of the reading.
    pub time: String,
    /// The real host date, `"DD.MM.YYYY"`.
    pub full_date: String,
    /// `date` + `time` resolved through the calendar.
    pub instant: NaiveDateTime,
}

/// Resolve `"DD.MM"` and `"HH:MM"` tokens with the default calendar.
///
/// # Examples
///
/// ```
/// use letter_engine::datetime::resolve_instant;
///
/// let chimes = resolve_instant("31.12", "23:55").unwrap();
/// let after = resolve_instant("01.01", "00:20").unwrap();
/// assert!(after > chimes);
/// ```
pub fn resolve_instant(date_token: &str, time_token: &str) -> Result<NaiveDateTime> {
    ProgramCalendar::default().resolve_tokens(date_token, time_token)
}

/// Format an instant as `"DD.MM HH:MM"`.
pub fn format_instant(instant: &NaiveDateTime) -> String {
    instant.format(INSTANT_FORMAT).to_string()
}
