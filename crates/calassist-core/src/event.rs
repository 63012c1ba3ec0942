//! Event types for calendar events.
//!
//! This module provides the core types for representing calendar events:
//! - [`Event`]: A provider-agnostic calendar occurrence (timed or all-day)
//! - [`Attendee`]: An invited person and their response
//! - [`EventDraft`]: The attributes used to create a new event
//! - [`EventChanges`]: A partial update applied to an existing event

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::links::{find_call_links, CallLink};
use crate::time::EventTime;

/// Prefix identifying a location marker event.
pub const EMOJI_WORLDMAP: &str = "🗺";

/// The response status for an event attendee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    /// The attendee has accepted the invitation.
    Accepted,
    /// The attendee has declined the invitation.
    Declined,
    /// The attendee has tentatively accepted.
    Tentative,
    /// The attendee has not responded.
    NeedsAction,
    /// Unknown response status.
    #[default]
    Unknown,
}

/// Whether an event blocks time on the calendar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transparency {
    /// The event blocks time (busy).
    #[default]
    Opaque,
    /// The event does not block time (free).
    Transparent,
}

/// Event visibility as exposed by the calendar service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// The calendar's default visibility.
    #[default]
    Default,
    Public,
    Private,
    Confidential,
}

impl Visibility {
    /// Returns the wire name of this visibility.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Public => "public",
            Self::Private => "private",
            Self::Confidential => "confidential",
        }
    }

    /// Parses a wire name, returning `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "default" => Some(Self::Default),
            "public" => Some(Self::Public),
            "private" => Some(Self::Private),
            "confidential" => Some(Self::Confidential),
            _ => None,
        }
    }
}

/// An attendee of a calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    /// The attendee's email address.
    pub email: String,
    /// The attendee's response status.
    pub response_status: ResponseStatus,
    /// Whether the service flagged this entry as the calendar owner.
    #[serde(default)]
    pub is_self: bool,
}

impl Attendee {
    /// Creates a new attendee with the given email and response.
    pub fn new(email: impl Into<String>, response_status: ResponseStatus) -> Self {
        Self {
            email: email.into(),
            response_status,
            is_self: false,
        }
    }

    /// Returns true if this attendee represents `identity`.
    pub fn is_identity(&self, identity: &str) -> bool {
        self.is_self || self.email.eq_ignore_ascii_case(identity)
    }
}

/// A calendar event from any provider.
///
/// This is the canonical representation of an event after fetching it from a
/// calendar transport. `start` and `end` are either both all-day dates or
/// both instants, and `end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Identifier assigned by the remote service (absent before creation).
    pub id: Option<String>,
    /// The event title/summary.
    pub summary: String,
    /// When the event starts.
    pub start: EventTime,
    /// When the event ends (exclusive).
    pub end: EventTime,
    /// Whether the event blocks time.
    pub transparency: Transparency,
    /// Visibility of the event.
    pub visibility: Visibility,
    /// Invited attendees, in the order the service returned them.
    pub attendees: Vec<Attendee>,
    /// Id of the recurring series this event is an instance of.
    pub recurring_event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free-text location as entered in the calendar, not a marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Conference link attached by the calendar service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hangout_link: Option<String>,
}

impl Event {
    /// Creates a new event with required fields.
    pub fn new(summary: impl Into<String>, start: EventTime, end: EventTime) -> Self {
        Self {
            id: None,
            summary: summary.into(),
            start,
            end,
            transparency: Transparency::Opaque,
            visibility: Visibility::Default,
            attendees: Vec::new(),
            recurring_event_id: None,
            description: None,
            location: None,
            hangout_link: None,
        }
    }

    /// Returns true if this is an all-day event.
    pub fn is_all_day(&self) -> bool {
        self.start.is_all_day()
    }

    /// Returns true if this all-day event is a location marker.
    pub fn is_location_marker(&self) -> bool {
        self.is_all_day() && self.summary.starts_with(EMOJI_WORLDMAP)
    }

    /// Returns the location named by a marker, if this is one.
    pub fn marker_location(&self) -> Option<&str> {
        if !self.is_location_marker() {
            return None;
        }
        Some(self.summary.trim_start_matches(EMOJI_WORLDMAP).trim())
    }

    /// Checks the interval invariant: same representation on both ends and
    /// `start < end`.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.start.same_kind(&self.end) || self.start >= self.end {
            return Err(CoreError::invalid_interval(
                self.describe(),
                &self.start,
                &self.end,
            ));
        }
        Ok(())
    }

    /// Checks whether two events' intervals intersect.
    ///
    /// Touching endpoints are not an overlap. Both events are compared on
    /// the UTC timeline; all-day dates are read as UTC midnight.
    pub fn overlaps(&self, other: &Event) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns the duration of the event.
    pub fn duration(&self) -> Duration {
        self.end.to_utc_datetime() - self.start.to_utc_datetime()
    }

    /// Returns the `[start, end)` instants of this event, reading all-day
    /// dates in `tz`.
    pub fn interval_in(&self, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.start.to_utc_in(tz), self.end.to_utc_in(tz))
    }

    /// Returns the first video-call link of the event, looking at the
    /// conference link, then the location, then the description.
    pub fn video_call(&self) -> Option<CallLink> {
        [&self.hangout_link, &self.location, &self.description]
            .into_iter()
            .flatten()
            .flat_map(|text| find_call_links(text))
            .find(CallLink::is_video_call)
    }

    /// Returns the attendee entry for `identity`, if present.
    pub fn attendee(&self, identity: &str) -> Option<&Attendee> {
        self.attendees.iter().find(|a| a.is_identity(identity))
    }

    fn describe(&self) -> String {
        match self.id {
            Some(ref id) => format!("event {} ({})", id, self.summary),
            None => format!("event '{}'", self.summary),
        }
    }

    /// Builder method to set the id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builder method to set transparency.
    pub fn with_transparency(mut self, transparency: Transparency) -> Self {
        self.transparency = transparency;
        self
    }

    /// Builder method to set visibility.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Builder method to add an attendee.
    pub fn with_attendee(mut self, attendee: Attendee) -> Self {
        self.attendees.push(attendee);
        self
    }

    /// Builder method to mark as an instance of a recurring series.
    pub fn with_recurring(mut self, recurring_event_id: impl Into<String>) -> Self {
        self.recurring_event_id = Some(recurring_event_id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_hangout_link(mut self, link: impl Into<String>) -> Self {
        self.hangout_link = Some(link.into());
        self
    }
}

/// The attributes used to create a new event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    pub summary: String,
    pub start: EventTime,
    pub end: EventTime,
    pub transparency: Transparency,
    pub visibility: Visibility,
}

impl EventDraft {
    /// Creates a busy draft with default visibility.
    pub fn new(summary: impl Into<String>, start: EventTime, end: EventTime) -> Self {
        Self {
            summary: summary.into(),
            start,
            end,
            transparency: Transparency::Opaque,
            visibility: Visibility::Default,
        }
    }

    /// Creates the all-day, not-busy marker for `location` over
    /// `[start, end)`.
    pub fn location_marker(location: &str, start: EventTime, end: EventTime) -> Self {
        Self {
            summary: format!("{}  {}", EMOJI_WORLDMAP, location),
            start,
            end,
            transparency: Transparency::Transparent,
            visibility: Visibility::Default,
        }
    }

    /// Returns the event this draft describes (without an id).
    pub fn to_event(&self) -> Event {
        Event::new(&self.summary, self.start.clone(), self.end.clone())
            .with_transparency(self.transparency)
            .with_visibility(self.visibility)
    }
}

/// A partial update to an existing event. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventChanges {
    pub summary: Option<String>,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    pub transparency: Option<Transparency>,
    pub visibility: Option<Visibility>,
}

impl EventChanges {
    /// Creates an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to move the start.
    pub fn with_start(mut self, start: EventTime) -> Self {
        self.start = Some(start);
        self
    }

    /// Builder method to move the end.
    pub fn with_end(mut self, end: EventTime) -> Self {
        self.end = Some(end);
        self
    }

    /// Builder method to change the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Returns true if nothing would change.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Returns a copy of `event` with these changes applied.
    pub fn apply_to(&self, event: &Event) -> Event {
        let mut updated = event.clone();
        if let Some(ref summary) = self.summary {
            updated.summary = summary.clone();
        }
        if let Some(ref start) = self.start {
            updated.start = start.clone();
        }
        if let Some(ref end) = self.end {
            updated.end = end.clone();
        }
        if let Some(transparency) = self.transparency {
            updated.transparency = transparency;
        }
        if let Some(visibility) = self.visibility {
            updated.visibility = visibility;
        }
        updated
    }
}
