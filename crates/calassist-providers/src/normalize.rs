//! Mapping between wire records and the event model.
//!
//! [`normalize_event`] turns a [`RawEvent`] into an [`Event`];
//! [`draft_to_raw`] and [`event_to_raw`] go the other way for inserts and
//! updates. Unknown enumeration strings fall back to the model's defaults.

use calassist_core::{
    Attendee, Event, EventDraft, EventTime, ResponseStatus, Transparency, Visibility,
};

use crate::raw_event::{
    RawAttendee, RawEvent, RawEventTime, TRANSPARENCY_OPAQUE, TRANSPARENCY_TRANSPARENT,
};

/// Converts a [`RawEvent`] to an [`Event`].
pub fn normalize_event(raw: &RawEvent) -> Event {
    let mut event = Event::new(
        raw.effective_title(),
        convert_time(&raw.start),
        convert_time(&raw.end),
    )
    .with_transparency(parse_transparency(raw.transparency.as_deref()))
    .with_visibility(
        raw.visibility
            .as_deref()
            .and_then(Visibility::parse)
            .unwrap_or_default(),
    );

    if let Some(ref id) = raw.id {
        event = event.with_id(id);
    }
    if let Some(ref series) = raw.recurring_event_id {
        event = event.with_recurring(series);
    }
    event.description = raw.description.clone();
    event.location = raw.location.clone();
    event.hangout_link = raw.hangout_link.clone();
    for attendee in &raw.attendees {
        let mut converted = Attendee::new(
            &attendee.email,
            parse_response_status(attendee.response_status.as_deref()),
        );
        converted.is_self = attendee.is_self;
        event = event.with_attendee(converted);
    }

    event
}

/// Converts raw events, dropping cancelled records.
pub fn normalize_events(raw_events: &[RawEvent]) -> Vec<Event> {
    raw_events
        .iter()
        .filter(|e| !e.is_cancelled())
        .map(normalize_event)
        .collect()
}

/// Builds the record inserted for a new event.
pub fn draft_to_raw(draft: &EventDraft) -> RawEvent {
    let mut raw = RawEvent::new(raw_time(&draft.start), raw_time(&draft.end))
        .with_summary(&draft.summary)
        .with_transparency(transparency_str(draft.transparency));
    if draft.visibility != Visibility::Default {
        raw = raw.with_visibility(draft.visibility.as_str());
    }
    raw
}

/// Builds the full replacement record for an existing event.
pub fn event_to_raw(event: &Event) -> RawEvent {
    let mut raw = RawEvent::new(raw_time(&event.start), raw_time(&event.end))
        .with_summary(&event.summary)
        .with_transparency(transparency_str(event.transparency));
    raw.id = event.id.clone();
    if event.visibility != Visibility::Default {
        raw = raw.with_visibility(event.visibility.as_str());
    }
    if let Some(ref series) = event.recurring_event_id {
        raw = raw.with_recurring(series);
    }
    raw.description = event.description.clone();
    raw.location = event.location.clone();
    raw.hangout_link = event.hangout_link.clone();
    for attendee in &event.attendees {
        let mut converted = RawAttendee::new(&attendee.email);
        converted.response_status = response_status_str(attendee.response_status).map(String::from);
        converted.is_self = attendee.is_self;
        raw = raw.with_attendee(converted);
    }
    raw
}

fn convert_time(raw: &RawEventTime) -> EventTime {
    match raw {
        RawEventTime::DateTime(dt) => EventTime::from_utc(*dt),
        RawEventTime::Date(date) => EventTime::from_date(*date),
    }
}

fn raw_time(time: &EventTime) -> RawEventTime {
    match time {
        EventTime::DateTime(dt) => RawEventTime::DateTime(*dt),
        EventTime::AllDay(date) => RawEventTime::Date(*date),
    }
}

fn parse_transparency(value: Option<&str>) -> Transparency {
    match value {
        Some(v) if v.eq_ignore_ascii_case(TRANSPARENCY_TRANSPARENT) => Transparency::Transparent,
        _ => Transparency::Opaque,
    }
}

fn transparency_str(transparency: Transparency) -> &'static str {
    match transparency {
        Transparency::Transparent => TRANSPARENCY_TRANSPARENT,
        Transparency::Opaque => TRANSPARENCY_OPAQUE,
    }
}

fn parse_response_status(value: Option<&str>) -> ResponseStatus {
    match value {
        Some("accepted") => ResponseStatus::Accepted,
        Some("declined") => ResponseStatus::Declined,
        Some("tentative") => ResponseStatus::Tentative,
        Some("needsAction") => ResponseStatus::NeedsAction,
        _ => ResponseStatus::Unknown,
    }
}

fn response_status_str(status: ResponseStatus) -> Option<&'static str> {
    match status {
        ResponseStatus::Accepted => Some("accepted"),
        ResponseStatus::Declined => Some("declined"),
        ResponseStatus::Tentative => Some("tentative"),
        ResponseStatus::NeedsAction => Some("needsAction"),
        ResponseStatus::Unknown => None,
    }
}
