//! Free-time computation within workday bounds.
//!
//! For each local calendar day touched by the queried range, the day's
//! workday window is clipped to the range, busy intervals inside it are
//! merged, and the gaps between them become [`AvailabilityBlock`]s. Blocks
//! shorter than the requested minimum are dropped. A block never crosses a
//! workday boundary, so blocks from consecutive days are never merged.
//!
//! The time zone and workday bounds arrive in an explicit
//! [`SchedulingContext`]; nothing here reads ambient process state.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::attributes::is_busy;
use crate::error::{CoreError, CoreResult};
use crate::event::Event;
use crate::time::{local_to_utc, TimeWindow};

/// The daily wall-clock window in which free time is searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkdayBounds {
    start_of_day: NaiveTime,
    end_of_day: NaiveTime,
}

impl WorkdayBounds {
    /// Creates workday bounds, rejecting `start_of_day >= end_of_day`.
    pub fn new(start_of_day: NaiveTime, end_of_day: NaiveTime) -> CoreResult<Self> {
        if start_of_day >= end_of_day {
            return Err(CoreError::configuration(format!(
                "start of day ({}) must be before end of day ({})",
                start_of_day.format("%H:%M"),
                end_of_day.format("%H:%M")
            )));
        }
        Ok(Self {
            start_of_day,
            end_of_day,
        })
    }

    /// Returns the start of each workday.
    pub fn start_of_day(&self) -> NaiveTime {
        self.start_of_day
    }

    /// Returns the end of each workday.
    pub fn end_of_day(&self) -> NaiveTime {
        self.end_of_day
    }

    /// Returns the workday window for `date` in `tz`.
    pub fn window_on(&self, date: NaiveDate, tz: &Tz) -> TimeWindow {
        let start = local_to_utc(tz, date.and_time(self.start_of_day));
        let end = local_to_utc(tz, date.and_time(self.end_of_day));
        TimeWindow::new(start, end.max(start))
    }
}

/// The explicit time zone and workday used by one scheduling pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingContext {
    pub time_zone: Tz,
    pub workday: WorkdayBounds,
}

impl SchedulingContext {
    /// Creates a scheduling context.
    pub fn new(time_zone: Tz, workday: WorkdayBounds) -> Self {
        Self {
            time_zone,
            workday,
        }
    }
}

/// A free interval `[start, end)` inside one day's workday window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityBlock {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl AvailabilityBlock {
    /// Returns the length of the block.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Returns the start in `tz`.
    pub fn local_start(&self, tz: &Tz) -> DateTime<Tz> {
        self.start.with_timezone(tz)
    }

    /// Returns the end in `tz`.
    pub fn local_end(&self, tz: &Tz) -> DateTime<Tz> {
        self.end.with_timezone(tz)
    }
}

/// The free blocks found on one local calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAvailability {
    /// The local date.
    pub date: NaiveDate,
    /// The workday window of that date, clipped to the queried range.
    pub window: TimeWindow,
    /// Free blocks in ascending order.
    pub blocks: Vec<AvailabilityBlock>,
}

/// Keeps only the events that block time for `self_identity`.
pub fn busy_events(events: &[Event], self_identity: &str) -> Vec<Event> {
    events
        .iter()
        .filter(|e| is_busy(e, self_identity))
        .cloned()
        .collect()
}

/// Computes free blocks per local day within `range`.
///
/// Every day whose workday window intersects `range` appears in the result,
/// even when it has no blocks.
pub fn available_days(
    range: &TimeWindow,
    busy: &[Event],
    context: &SchedulingContext,
    min_duration: Duration,
) -> CoreResult<Vec<DayAvailability>> {
    if range.start >= range.end {
        return Err(CoreError::invalid_interval(
            "availability range",
            range.start.to_rfc3339(),
            range.end.to_rfc3339(),
        ));
    }
    if min_duration < Duration::zero() {
        return Err(CoreError::configuration(format!(
            "minimum duration must not be negative (got {} minutes)",
            min_duration.num_minutes()
        )));
    }
    for event in busy {
        event.validate()?;
    }

    let tz = &context.time_zone;
    let intervals: Vec<(DateTime<Utc>, DateTime<Utc>)> =
        busy.iter().map(|e| e.interval_in(tz)).collect();

    let mut days = Vec::new();
    for date in range.local_dates(tz) {
        let Some(window) = context.workday.window_on(date, tz).clip(range) else {
            trace!(%date, "workday outside queried range");
            continue;
        };

        let merged = merge_busy_periods(&intervals, &window);
        let blocks: Vec<AvailabilityBlock> = free_gaps(&merged, &window)
            .into_iter()
            .filter(|b| b.duration() >= min_duration)
            .collect();

        debug!(
            %date,
            busy = merged.len(),
            free = blocks.len(),
            "computed availability"
        );
        days.push(DayAvailability {
            date,
            window,
            blocks,
        });
    }

    Ok(days)
}

/// Computes the free blocks of at least `min_duration` inside `range`.
///
/// Blocks are pairwise disjoint, ascending, and each lies inside one day's
/// workday window in the context's time zone.
pub fn available_blocks(
    range: &TimeWindow,
    busy: &[Event],
    context: &SchedulingContext,
    min_duration: Duration,
) -> CoreResult<Vec<AvailabilityBlock>> {
    Ok(available_days(range, busy, context, min_duration)?
        .into_iter()
        .flat_map(|day| day.blocks)
        .collect())
}

/// Merges overlapping or adjacent busy intervals, clipped to `window`.
///
/// Returns a sorted, non-overlapping list of `(start, end)` pairs.
fn merge_busy_periods(
    intervals: &[(DateTime<Utc>, DateTime<Utc>)],
    window: &TimeWindow,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut clipped: Vec<(DateTime<Utc>, DateTime<Utc>)> = intervals
        .iter()
        .filter(|(start, end)| window.overlaps(*start, *end))
        .map(|(start, end)| ((*start).max(window.start), (*end).min(window.end)))
        .collect();

    clipped.sort_unstable();

    let mut merged: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::with_capacity(clipped.len());
    for (start, end) in clipped {
        if let Some(last) = merged.last_mut() {
            if start <= last.1 {
                last.1 = last.1.max(end);
                continue;
            }
        }
        merged.push((start, end));
    }
    merged
}

/// Returns the gaps between merged busy periods inside `window`.
fn free_gaps(
    merged: &[(DateTime<Utc>, DateTime<Utc>)],
    window: &TimeWindow,
) -> Vec<AvailabilityBlock> {
    let mut gaps = Vec::new();
    let mut cursor = window.start;

    for (busy_start, busy_end) in merged {
        if cursor < *busy_start {
            gaps.push(AvailabilityBlock {
                start: cursor,
                end: *busy_start,
            });
        }
        cursor = cursor.max(*busy_end);
    }

    if cursor < window.end {
        gaps.push(AvailabilityBlock {
            start: cursor,
            end: window.end,
        });
    }
    gaps
}
