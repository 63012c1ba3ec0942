//! Parsing of the date, time and duration arguments.
//!
//! - DATESPEC: `today`, `tomorrow`, `yesterday`, `YYYY-MM-DD`,
//!   `YYYY-MM-DD HH:MM`, or a range `A...B` of any of these
//! - TIME: `9am`, `5:30pm`, `14:30`, `9`
//! - LENGTH: `30m`, `2h`, `1h30m`, `90` (minutes)
//! - MOMENT: `now`, a TIME today, or `YYYY-MM-DD HH:MM`
//!
//! "Today" is always passed in, never read from the clock here.

use std::sync::LazyLock;

use calassist_core::{local_to_utc, CoreError, TimeWindow};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use regex::Regex;
use serde::Serialize;

use crate::error::{AssistantError, AssistantResult};

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{1,2})(?::(\d{2}))?\s*([ap]\.?m\.?)?$").expect("Invalid time regex")
});

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:(\d+)\s*(?:h|hrs?|hours?))?\s*(?:(\d+)\s*(?:m|mins?|minutes?))?$")
        .expect("Invalid duration regex")
});

const RANGE_SEPARATOR: &str = "...";

/// An inclusive range of calendar dates.
///
/// A time of day in the input is accepted and widened to its whole day, so
/// `2018-10-18 14:00` selects all of 2018-10-18.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateSpec {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl DateSpec {
    /// A range of one date.
    pub fn single(date: NaiveDate) -> Self {
        Self {
            first: date,
            last: date,
        }
    }

    /// Parses a DATESPEC relative to `today`.
    ///
    /// A range whose end precedes its start is an invalid interval.
    pub fn parse(input: &str, today: NaiveDate) -> AssistantResult<Self> {
        let input = input.trim();
        let Some((start, end)) = input.split_once(RANGE_SEPARATOR) else {
            return Ok(Self::single(parse_date_point(input, today)?));
        };

        let first = parse_date_point(start, today)?;
        let last = parse_date_point(end, today)?;
        if last < first {
            return Err(CoreError::invalid_interval("date range", first, last).into());
        }
        Ok(Self { first, last })
    }

    /// The day after the last date, as used for all-day end dates.
    pub fn end_exclusive(&self) -> NaiveDate {
        self.last.succ_opt().unwrap_or(self.last)
    }

    /// The instants from the start of the first date to the end of the last
    /// date in `tz`.
    pub fn window(&self, tz: &Tz) -> TimeWindow {
        TimeWindow::for_dates(self.first, self.end_exclusive(), tz)
    }
}

fn parse_date_point(input: &str, today: NaiveDate) -> AssistantResult<NaiveDate> {
    let input = input.trim();
    let relative = match input.to_ascii_lowercase().as_str() {
        "today" | "now" => Some(today),
        "tomorrow" => today.succ_opt(),
        "yesterday" => today.pred_opt(),
        _ => None,
    };
    if let Some(date) = relative {
        return Ok(date);
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date);
    }
    ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .map(|dt| dt.date())
        .ok_or_else(|| AssistantError::parse("date", input))
}

/// Parses a wall-clock time such as `9am`, `5:30pm`, `14:30` or `9`.
pub fn parse_time(input: &str) -> AssistantResult<NaiveTime> {
    let input = input.trim();
    let invalid = || AssistantError::parse("time", input);
    let caps = TIME_RE.captures(input).ok_or_else(invalid)?;

    let hour: u32 = caps[1].parse().map_err(|_| invalid())?;
    let minute: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().map_err(|_| invalid())?,
        None => 0,
    };
    let hour = match caps.get(3).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(meridiem) => {
            if !(1..=12).contains(&hour) {
                return Err(invalid());
            }
            match (meridiem.starts_with('p'), hour) {
                (false, 12) => 0,
                (true, 12) => 12,
                (false, h) => h,
                (true, h) => h + 12,
            }
        }
        None => hour,
    };

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// Parses the moment a `join` looks at: `now`, a TIME on the local date of
/// `now`, or a local `YYYY-MM-DD HH:MM`.
pub fn parse_moment(input: &str, now: DateTime<Utc>, tz: &Tz) -> AssistantResult<DateTime<Utc>> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("now") {
        return Ok(now);
    }

    let local = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok());
    let local = match local {
        Some(local) => local,
        None => {
            let time = parse_time(input).map_err(|_| AssistantError::parse("moment", input))?;
            now.with_timezone(tz).date_naive().and_time(time)
        }
    };
    Ok(local_to_utc(tz, local))
}

/// Parses a meeting length such as `30m`, `2h`, `1h30m` or `90`.
///
/// The length must be positive.
pub fn parse_duration(input: &str) -> AssistantResult<Duration> {
    let input = input.trim();
    let invalid = || AssistantError::parse("duration", input);

    let minutes = if input.chars().all(|c| c.is_ascii_digit()) && !input.is_empty() {
        input.parse::<i64>().map_err(|_| invalid())?
    } else {
        let caps = DURATION_RE.captures(input).ok_or_else(invalid)?;
        let (hours, minutes) = (caps.get(1), caps.get(2));
        if hours.is_none() && minutes.is_none() {
            return Err(invalid());
        }
        let number = |m: Option<regex::Match<'_>>| -> AssistantResult<i64> {
            m.map_or(Ok(0), |m| m.as_str().parse().map_err(|_| invalid()))
        };
        let (hours, minutes) = (number(hours)?, number(minutes)?);
        hours
            .checked_mul(60)
            .and_then(|m| m.checked_add(minutes))
            .ok_or_else(invalid)?
    };

    if minutes <= 0 {
        return Err(invalid());
    }
    Duration::try_minutes(minutes).ok_or_else(invalid)
}
