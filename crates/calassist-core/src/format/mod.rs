//! Text and JSON rendering of events, location changes and availability.
//!
//! Every function takes the display time zone explicitly. Timed events are
//! shown in that zone; all-day events are shown by their dates.
//!
//! ```rust
//! use calassist_core::format::format_duration;
//! use chrono::Duration;
//!
//! assert_eq!(format_duration(Duration::minutes(90)), "1h30m");
//! ```

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::attributes::{classify, Attribute, AttributeSet};
use crate::availability::{AvailabilityBlock, DayAvailability};
use crate::event::Event;
use crate::reconcile::LocationChanges;

/// Width of the date column in event lines.
pub const DATE_COLUMN_WIDTH: usize = 25;

const NO_EVENTS: &str = "No events in this time range.";
const NO_BLOCKS: &str = "(No available blocks in this time range.)";
const NOW_LABEL: &str = "now";

/// Attributes that are never listed after an event's summary.
const HIDDEN_ATTRIBUTES: [Attribute; 3] =
    [Attribute::Accepted, Attribute::Commitment, Attribute::Declined];

/// Describes when an event happens, as shown in the date column.
///
/// - one-day all-day event: `2018-10-18`
/// - multi-day all-day event: `2018-10-18 - 2018-10-20` (last day inclusive)
/// - timed event within a day: `2018-10-18  09:00 - 10:00`
/// - timed event across days: `2018-10-18 23:00  -  2018-10-19 01:00`
pub fn event_date_description(event: &Event, tz: &Tz) -> String {
    if event.is_all_day() {
        let start = event.start.date();
        let end = event.end.date();
        if (end - start).num_days() <= 1 {
            return start.format("%Y-%m-%d").to_string();
        }
        let last = end.pred_opt().unwrap_or(end);
        return format!("{} - {}", start.format("%Y-%m-%d"), last.format("%Y-%m-%d"));
    }

    let (start, end) = event.interval_in(tz);
    let start = start.with_timezone(tz);
    let end = end.with_timezone(tz);
    if start.date_naive() == end.date_naive() {
        format!(
            "{} - {}",
            start.format("%Y-%m-%d  %H:%M"),
            end.format("%H:%M")
        )
    } else {
        format!(
            "{}  -  {}",
            start.format("%Y-%m-%d %H:%M"),
            end.format("%Y-%m-%d %H:%M")
        )
    }
}

/// Returns the attributes listed after an event's summary.
pub fn displayed_attributes(attributes: AttributeSet) -> AttributeSet {
    let mut shown = attributes;
    for hidden in HIDDEN_ATTRIBUTES {
        shown.remove(hidden);
    }
    shown
}

/// Renders one event line.
///
/// Declined events are struck through with `~~`.
pub fn event_line(event: &Event, attributes: AttributeSet, tz: &Tz) -> String {
    let mut line = format!(
        "{:<width$.width$} | {}",
        event_date_description(event, tz),
        event.summary,
        width = DATE_COLUMN_WIDTH
    );

    let shown = displayed_attributes(attributes);
    if !shown.is_empty() {
        line.push_str(&format!(" ({})", shown));
    }

    if attributes.contains(Attribute::Declined) {
        format!("~~{}~~", line)
    } else {
        line
    }
}

/// Renders a list of events, one per line.
///
/// With `commitments_only`, events without the `commitment` attribute are
/// skipped.
pub fn format_events(
    events: &[Event],
    self_identity: &str,
    tz: &Tz,
    commitments_only: bool,
) -> String {
    render_events(events, self_identity, tz, commitments_only, None)
}

/// Like [`format_events`], with a `now` line placed before the first timed
/// event that starts later on the same local day as `now`.
pub fn format_events_at(
    events: &[Event],
    self_identity: &str,
    tz: &Tz,
    commitments_only: bool,
    now: DateTime<Utc>,
) -> String {
    render_events(events, self_identity, tz, commitments_only, Some(now))
}

fn render_events(
    events: &[Event],
    self_identity: &str,
    tz: &Tz,
    commitments_only: bool,
    mut now: Option<DateTime<Utc>>,
) -> String {
    let mut lines = Vec::new();
    for (event, attrs) in events
        .iter()
        .map(|e| (e, classify(e, self_identity)))
        .filter(|(_, attrs)| !commitments_only || attrs.contains(Attribute::Commitment))
    {
        if let Some(at) = now.filter(|at| is_upcoming_today(event, *at, tz)) {
            lines.push(now_line(at, tz));
            now = None;
        }
        lines.push(event_line(event, attrs, tz));
    }

    if lines.is_empty() {
        return NO_EVENTS.to_string();
    }
    lines.join("\n")
}

fn is_upcoming_today(event: &Event, now: DateTime<Utc>, tz: &Tz) -> bool {
    if event.is_all_day() {
        return false;
    }
    let (start, _) = event.interval_in(tz);
    start > now && start.with_timezone(tz).date_naive() == now.with_timezone(tz).date_naive()
}

fn now_line(now: DateTime<Utc>, tz: &Tz) -> String {
    format!(
        "{:<width$} | {}",
        now.with_timezone(tz).format("%Y-%m-%d  %H:%M").to_string(),
        NOW_LABEL,
        width = DATE_COLUMN_WIDTH
    )
}

/// Renders the outcome of a location change.
///
/// `Created:` is always shown; `Deleted:` and `Modified:` only when they
/// have entries.
pub fn format_location_changes(changes: &LocationChanges, self_identity: &str, tz: &Tz) -> String {
    let mut sections = vec![section("Created", &changes.created, self_identity, tz)];
    if !changes.deleted.is_empty() {
        sections.push(section("Deleted", &changes.deleted, self_identity, tz));
    }
    if !changes.modified.is_empty() {
        sections.push(section("Modified", &changes.modified, self_identity, tz));
    }
    sections.join("\n")
}

fn section(title: &str, events: &[Event], self_identity: &str, tz: &Tz) -> String {
    format!(
        "{}:\n{}",
        title,
        format_events(events, self_identity, tz, false)
    )
}

/// Renders free blocks grouped by day.
///
/// Each day gets a header with its workday window and the minimum block
/// length, followed by one bullet per block.
pub fn format_availability(days: &[DayAvailability], min_duration: Duration, tz: &Tz) -> String {
    if days.is_empty() {
        return NO_BLOCKS.to_string();
    }

    days.iter()
        .map(|day| {
            let mut lines = vec![format!(
                "{} ({}): {} - {}, at least {}",
                day.date.format("%Y-%m-%d"),
                day.date.format("%A"),
                local_hm(day.window.start, tz),
                local_hm(day.window.end, tz),
                format_duration(min_duration)
            )];
            if day.blocks.is_empty() {
                lines.push(NO_BLOCKS.to_string());
            } else {
                lines.extend(day.blocks.iter().map(|b| block_line(b, tz)));
            }
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn block_line(block: &AvailabilityBlock, tz: &Tz) -> String {
    format!(
        "• {} - {} ({})",
        block.local_start(tz).format("%H:%M"),
        block.local_end(tz).format("%H:%M"),
        format_duration(block.duration())
    )
}

fn local_hm(dt: DateTime<Utc>, tz: &Tz) -> String {
    dt.with_timezone(tz).format("%H:%M").to_string()
}

/// Formats a duration as `1h30m`, `2h` or `45m`.
pub fn format_duration(duration: Duration) -> String {
    let minutes = duration.num_minutes().max(0);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    match (hours, minutes) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h{}m", h, m),
    }
}

/// JSON view of an event with its derived attributes.
#[derive(Debug, Clone, Serialize)]
pub struct JsonEvent<'a> {
    #[serde(flatten)]
    pub event: &'a Event,
    pub attributes: AttributeSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<&'a str>,
}

impl<'a> JsonEvent<'a> {
    /// Builds the JSON view of `event` as seen by `self_identity`.
    pub fn new(event: &'a Event, self_identity: &str) -> Self {
        Self {
            event,
            attributes: classify(event, self_identity),
            location: event.marker_location(),
        }
    }
}

/// Builds JSON views for a list of events.
pub fn json_events<'a>(events: &'a [Event], self_identity: &str) -> Vec<JsonEvent<'a>> {
    events.iter().map(|e| JsonEvent::new(e, self_identity)).collect()
}
