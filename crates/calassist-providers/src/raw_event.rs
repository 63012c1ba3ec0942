//! Wire-level event records exchanged with a [`CalendarTransport`].
//!
//! [`RawEvent`] mirrors the shape of a remote calendar service's event
//! resource: optional strings for enumerations, `{"date": ..}` or
//! `{"dateTime": ..}` for times, camelCase keys. The local JSON store
//! persists exactly this shape. Conversion to the model lives in
//! [`crate::normalize`].
//!
//! [`CalendarTransport`]: crate::transport::CalendarTransport

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Wire value of `transparency` for events that do not block time.
pub const TRANSPARENCY_TRANSPARENT: &str = "transparent";
/// Wire value of `transparency` for busy events.
pub const TRANSPARENCY_OPAQUE: &str = "opaque";
/// Wire value of `status` for cancelled records.
pub const STATUS_CANCELLED: &str = "cancelled";

/// Start or end of a raw event: `{"dateTime": ..}` or `{"date": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RawEventTime {
    DateTime(DateTime<Utc>),
    /// Exclusive when used as an end.
    Date(NaiveDate),
}

impl RawEventTime {
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::Date(_))
    }
}

impl From<DateTime<Utc>> for RawEventTime {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::DateTime(instant)
    }
}

impl From<NaiveDate> for RawEventTime {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

/// One entry of an event's guest list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttendee {
    pub email: String,
    /// `accepted`, `declined`, `tentative` or `needsAction`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_status: Option<String>,
    /// True on the entry describing the calendar owner.
    #[serde(default, rename = "self", skip_serializing_if = "std::ops::Not::not")]
    pub is_self: bool,
}

impl RawAttendee {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            response_status: None,
            is_self: false,
        }
    }

    pub fn with_response(self, status: impl Into<String>) -> Self {
        Self {
            response_status: Some(status.into()),
            ..self
        }
    }

    pub fn as_self(self) -> Self {
        Self {
            is_self: true,
            ..self
        }
    }
}

/// The stored form of one calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    /// `None` until the store assigns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub start: RawEventTime,
    pub end: RawEventTime,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// `transparent` or `opaque`. Missing reads as opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparency: Option<String>,

    /// `default`, `public`, `private` or `confidential`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,

    /// `confirmed`, `tentative` or `cancelled`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_event_id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<RawAttendee>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Conference link attached by the calendar service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hangout_link: Option<String>,
}

const UNTITLED: &str = "(No title)";

impl RawEvent {
    pub fn new(start: impl Into<RawEventTime>, end: impl Into<RawEventTime>) -> Self {
        Self {
            id: None,
            start: start.into(),
            end: end.into(),
            summary: None,
            transparency: None,
            visibility: None,
            status: None,
            recurring_event_id: None,
            attendees: Vec::new(),
            description: None,
            location: None,
            hangout_link: None,
        }
    }

    /// The summary, with blank or missing ones shown as `(No title)`.
    pub fn effective_title(&self) -> &str {
        match self.summary.as_deref() {
            Some(summary) if !summary.trim().is_empty() => summary,
            _ => UNTITLED,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(&self.status, Some(status) if status.eq_ignore_ascii_case(STATUS_CANCELLED))
    }

    pub fn is_all_day(&self) -> bool {
        self.start.is_all_day()
    }

    pub fn with_id(self, id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..self
        }
    }

    pub fn with_summary(self, summary: impl Into<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            ..self
        }
    }

    pub fn with_transparency(self, transparency: impl Into<String>) -> Self {
        Self {
            transparency: Some(transparency.into()),
            ..self
        }
    }

    pub fn with_visibility(self, visibility: impl Into<String>) -> Self {
        Self {
            visibility: Some(visibility.into()),
            ..self
        }
    }

    pub fn with_status(self, status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            ..self
        }
    }

    /// Marks the record as one instance of the series `recurring_event_id`.
    pub fn with_recurring(self, recurring_event_id: impl Into<String>) -> Self {
        Self {
            recurring_event_id: Some(recurring_event_id.into()),
            ..self
        }
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..self
        }
    }

    pub fn with_location(self, location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..self
        }
    }

    pub fn with_hangout_link(self, link: impl Into<String>) -> Self {
        Self {
            hangout_link: Some(link.into()),
            ..self
        }
    }

    pub fn with_attendee(mut self, attendee: RawAttendee) -> Self {
        self.attendees.push(attendee);
        self
    }
}
