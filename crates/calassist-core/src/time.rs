//! Instants, all-day dates and query windows.
//!
//! An all-day date has no zone. Code that needs it on the timeline passes
//! the zone explicitly, see [`EventTime::to_utc_in`].

use std::cmp::Ordering;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Start or end of an event.
///
/// `AllDay` ends are exclusive: a one-day event on the 18th ends on the 19th.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum EventTime {
    DateTime(DateTime<Utc>),
    AllDay(NaiveDate),
}

impl EventTime {
    pub fn from_utc(instant: DateTime<Utc>) -> Self {
        Self::DateTime(instant)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self::AllDay(date)
    }

    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay(_))
    }

    /// Both all-day, or both instants.
    pub fn same_kind(&self, other: &EventTime) -> bool {
        self.is_all_day() == other.is_all_day()
    }

    /// Sort key: all-day dates count as UTC midnight.
    pub fn to_utc_datetime(&self) -> DateTime<Utc> {
        self.to_utc_in(&Tz::UTC)
    }

    /// Places this time on the timeline, reading all-day dates as local
    /// midnight in `tz`.
    pub fn to_utc_in(&self, tz: &Tz) -> DateTime<Utc> {
        match *self {
            Self::DateTime(instant) => instant,
            Self::AllDay(date) => local_to_utc(tz, date.and_time(NaiveTime::MIN)),
        }
    }

    /// Calendar date; instants use their UTC date.
    pub fn date(&self) -> NaiveDate {
        match *self {
            Self::DateTime(instant) => instant.date_naive(),
            Self::AllDay(date) => date,
        }
    }
}

impl std::fmt::Display for EventTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DateTime(instant) => f.write_str(&instant.to_rfc3339()),
            Self::AllDay(date) => write!(f, "{}", date),
        }
    }
}

impl Ord for EventTime {
    /// By instant; on a tie the instant sorts before the all-day date.
    fn cmp(&self, other: &Self) -> Ordering {
        (self.to_utc_datetime(), self.is_all_day())
            .cmp(&(other.to_utc_datetime(), other.is_all_day()))
    }
}

impl PartialOrd for EventTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Resolves a wall-clock time in `tz` to an instant.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant. Times in a
/// DST gap move forward in half-hour steps to the first one that exists.
pub fn local_to_utc(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return dt.with_timezone(&Utc);
    }
    let mut shifted = naive;
    for _ in 0..8 {
        shifted += Duration::minutes(30);
        if let Some(dt) = tz.from_local_datetime(&shifted).earliest() {
            return dt.with_timezone(&Utc);
        }
    }
    tz.from_utc_datetime(&naive).with_timezone(&Utc)
}

/// A half-open span of instants `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// # Panics
    ///
    /// Panics if `start` is after `end`. Use [`TimeWindow::try_new`] for
    /// user-supplied ranges.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "window start must be <= end, got {} > {}", start, end);
        Self { start, end }
    }

    /// Creates a non-empty time window, rejecting `start >= end`.
    pub fn try_new(start: DateTime<Utc>, end: DateTime<Utc>) -> CoreResult<Self> {
        if start >= end {
            return Err(CoreError::invalid_interval(
                "time window",
                start.to_rfc3339(),
                end.to_rfc3339(),
            ));
        }
        Ok(Self { start, end })
    }

    /// The whole local day `date` in `tz`.
    pub fn for_date(date: NaiveDate, tz: &Tz) -> Self {
        let next = date.succ_opt().unwrap_or(date);
        Self::for_dates(date, next, tz)
    }

    /// Creates a time window covering the dates `[first, end_exclusive)` in
    /// the given timezone.
    pub fn for_dates(first: NaiveDate, end_exclusive: NaiveDate, tz: &Tz) -> Self {
        let start = local_to_utc(tz, first.and_time(NaiveTime::MIN));
        let end = local_to_utc(tz, end_exclusive.and_time(NaiveTime::MIN));
        Self::new(start, end.max(start))
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// True for `start`, false for `end`.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt < self.end
    }

    /// Whether `[start, end)` shares an instant with this window. Touching
    /// endpoints do not.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && end > self.start
    }

    /// Returns the intersection with another window, if non-empty.
    pub fn clip(&self, other: &TimeWindow) -> Option<TimeWindow> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(TimeWindow { start, end })
    }

    /// Returns every local calendar date in `tz` that this window touches,
    /// in ascending order.
    pub fn local_dates(&self, tz: &Tz) -> Vec<NaiveDate> {
        let first = self.start.with_timezone(tz).date_naive();
        let last = if self.end > self.start {
            (self.end - Duration::nanoseconds(1))
                .with_timezone(tz)
                .date_naive()
        } else {
            first
        };
        first.iter_days().take_while(|d| *d <= last).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod event_time {
        use super::*;

        #[test]
        fn datetime_creation() {
            let dt = utc(2018, 10, 18, 10, 30, 0);
            let et = EventTime::from_utc(dt);
            assert!(!et.is_all_day());
            assert_eq!(et.to_utc_datetime(), dt);
            assert_eq!(et.date(), date(2018, 10, 18));
        }

        #[test]
        fn allday_creation() {
            let d = date(2018, 10, 18);
            let et = EventTime::from_date(d);
            assert!(et.is_all_day());
            assert_eq!(et.date(), d);
            assert_eq!(et.to_utc_datetime(), utc(2018, 10, 18, 0, 0, 0));
        }

        #[test]
        fn same_kind() {
            let a = EventTime::from_date(date(2018, 10, 18));
            let b = EventTime::from_date(date(2018, 10, 19));
            let c = EventTime::from_utc(utc(2018, 10, 18, 9, 0, 0));
            assert!(a.same_kind(&b));
            assert!(!a.same_kind(&c));
        }

        #[test]
        fn to_utc_in_zone() {
            let et = EventTime::from_date(date(2018, 10, 18));
            let tz: Tz = "America/New_York".parse().unwrap();
            assert_eq!(et.to_utc_in(&tz), utc(2018, 10, 18, 4, 0, 0));
            assert_eq!(et.to_utc_in(&Tz::UTC), utc(2018, 10, 18, 0, 0, 0));

            let dt = EventTime::from_utc(utc(2018, 10, 18, 9, 0, 0));
            assert_eq!(dt.to_utc_in(&tz), utc(2018, 10, 18, 9, 0, 0));
        }

        #[test]
        fn ordering() {
            let et1 = EventTime::from_utc(utc(2018, 10, 18, 10, 0, 0));
            let et2 = EventTime::from_utc(utc(2018, 10, 18, 11, 0, 0));
            let et3 = EventTime::from_date(date(2018, 10, 18));

            assert!(et3 < et1);
            assert!(et1 < et2);
            assert!(EventTime::from_date(date(2018, 10, 17)) < et3);
            assert!(EventTime::from_utc(utc(2018, 10, 18, 0, 0, 0)) < et3);
        }

        #[test]
        fn display() {
            assert_eq!(EventTime::from_date(date(2018, 10, 18)).to_string(), "2018-10-18");
            assert_eq!(
                EventTime::from_utc(utc(2018, 10, 18, 9, 0, 0)).to_string(),
                "2018-10-18T09:00:00+00:00"
            );
        }

        #[test]
        fn serde_roundtrip() {
            let et = EventTime::from_date(date(2018, 10, 18));
            let json = serde_json::to_string(&et).unwrap();
            assert_eq!(json, r#"{"type":"AllDay","value":"2018-10-18"}"#);
            let parsed: EventTime = serde_json::from_str(&json).unwrap();
            assert_eq!(et, parsed);
        }
    }

    mod local_resolution {
        use super::*;

        #[test]
        fn dst_gap_moves_forward() {
            let tz: Tz = "America/New_York".parse().unwrap();
            // 2018-03-11 02:30 does not exist in New York.
            let naive = date(2018, 3, 11).and_hms_opt(2, 30, 0).unwrap();
            assert_eq!(local_to_utc(&tz, naive), utc(2018, 3, 11, 7, 0, 0));
        }

        #[test]
        fn dst_overlap_picks_earliest() {
            let tz: Tz = "America/New_York".parse().unwrap();
            // 2018-11-04 01:30 happens twice; the first is EDT (UTC-4).
            let naive = date(2018, 11, 4).and_hms_opt(1, 30, 0).unwrap();
            assert_eq!(local_to_utc(&tz, naive), utc(2018, 11, 4, 5, 30, 0));
        }
    }

    mod time_window {
        use super::*;

        #[test]
        fn length() {
            let window = TimeWindow::new(utc(2018, 10, 18, 9, 0, 0), utc(2018, 10, 18, 17, 0, 0));
            assert_eq!(window.duration(), Duration::hours(8));
        }

        #[test]
        #[should_panic(expected = "window start must be <= end")]
        fn reversed_bounds_panic() {
            TimeWindow::new(utc(2018, 10, 18, 17, 0, 0), utc(2018, 10, 18, 9, 0, 0));
        }

        #[test]
        fn try_new_rejects_empty() {
            let t = utc(2018, 10, 18, 9, 0, 0);
            assert!(TimeWindow::try_new(t, t).unwrap_err().is_invalid_interval());
            assert!(TimeWindow::try_new(t, t + Duration::minutes(1)).is_ok());
        }

        #[test]
        fn contains_is_half_open() {
            let window = TimeWindow::new(utc(2018, 10, 18, 9, 0, 0), utc(2018, 10, 18, 17, 0, 0));
            assert!(window.contains(utc(2018, 10, 18, 9, 0, 0)));
            assert!(window.contains(utc(2018, 10, 18, 16, 59, 59)));
            assert!(!window.contains(utc(2018, 10, 18, 17, 0, 0)));
        }

        #[test]
        fn overlaps() {
            let window = TimeWindow::new(utc(2018, 10, 18, 9, 0, 0), utc(2018, 10, 18, 17, 0, 0));
            assert!(window.overlaps(utc(2018, 10, 18, 8, 0, 0), utc(2018, 10, 18, 10, 0, 0)));
            assert!(window.overlaps(utc(2018, 10, 18, 8, 0, 0), utc(2018, 10, 18, 18, 0, 0)));
            assert!(!window.overlaps(utc(2018, 10, 18, 8, 0, 0), utc(2018, 10, 18, 9, 0, 0)));
            assert!(!window.overlaps(utc(2018, 10, 18, 17, 0, 0), utc(2018, 10, 18, 18, 0, 0)));
        }

        #[test]
        fn clip() {
            let a = TimeWindow::new(utc(2018, 10, 18, 9, 0, 0), utc(2018, 10, 18, 17, 0, 0));
            let b = TimeWindow::new(utc(2018, 10, 18, 12, 0, 0), utc(2018, 10, 19, 0, 0, 0));
            let clipped = a.clip(&b).unwrap();
            assert_eq!(clipped.start, utc(2018, 10, 18, 12, 0, 0));
            assert_eq!(clipped.end, utc(2018, 10, 18, 17, 0, 0));

            let c = TimeWindow::new(utc(2018, 10, 18, 17, 0, 0), utc(2018, 10, 18, 18, 0, 0));
            assert!(a.clip(&c).is_none());
        }

        #[test]
        fn for_dates_in_zone() {
            let tz: Tz = "Europe/Paris".parse().unwrap();
            let window = TimeWindow::for_dates(date(2018, 10, 17), date(2018, 10, 20), &tz);
            assert_eq!(window.start, utc(2018, 10, 16, 22, 0, 0));
            assert_eq!(window.end, utc(2018, 10, 19, 22, 0, 0));
        }

        #[test]
        fn for_date() {
            let window = TimeWindow::for_date(date(2018, 10, 18), &Tz::UTC);
            assert_eq!(window.start, utc(2018, 10, 18, 0, 0, 0));
            assert_eq!(window.end, utc(2018, 10, 19, 0, 0, 0));
        }

        #[test]
        fn local_dates() {
            let window = TimeWindow::for_dates(date(2018, 10, 17), date(2018, 10, 20), &Tz::UTC);
            assert_eq!(
                window.local_dates(&Tz::UTC),
                vec![date(2018, 10, 17), date(2018, 10, 18), date(2018, 10, 19)]
            );

            // Same instants seen from New York start on the previous evening.
            let tz: Tz = "America/New_York".parse().unwrap();
            assert_eq!(window.local_dates(&tz).first(), Some(&date(2018, 10, 16)));
        }
    }
}
