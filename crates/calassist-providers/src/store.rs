//! Calendar document shared by the in-memory and file-backed transports.
//!
//! A [`CalendarStore`] holds every calendar with its raw events and the
//! next id to assign. It serializes to the JSON layout of the local store:
//!
//! ```json
//! {
//!   "nextId": 3,
//!   "calendars": {
//!     "primary": { "timeZone": "Europe/Paris", "events": [ ... ] }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use calassist_core::{local_to_utc, TimeWindow};
use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, ProviderResult};
use crate::raw_event::{RawEvent, RawEventTime};
use crate::transport::CalendarInfo;

/// One calendar and its events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCalendar {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub events: Vec<RawEvent>,
}

impl StoredCalendar {
    fn tz(&self) -> ProviderResult<Tz> {
        match self.time_zone {
            Some(ref name) => name.parse::<Tz>().map_err(|_| {
                ProviderError::invalid_response(format!("unknown time zone '{}'", name))
            }),
            None => Ok(Tz::UTC),
        }
    }
}

/// All calendars of a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarStore {
    #[serde(default = "first_id")]
    pub next_id: u64,
    #[serde(default)]
    pub calendars: BTreeMap<String, StoredCalendar>,
}

fn first_id() -> u64 {
    1
}

impl Default for CalendarStore {
    fn default() -> Self {
        Self {
            next_id: first_id(),
            calendars: BTreeMap::new(),
        }
    }
}

impl CalendarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty calendar, or updates the time zone of an existing one.
    pub fn add_calendar(&mut self, calendar_id: impl Into<String>, time_zone: Option<String>) {
        let calendar = self.calendars.entry(calendar_id.into()).or_default();
        if time_zone.is_some() {
            calendar.time_zone = time_zone;
        }
    }

    pub fn calendar_info(&self, calendar_id: &str) -> ProviderResult<CalendarInfo> {
        let calendar = self.calendar(calendar_id)?;
        let mut info = CalendarInfo::new(calendar_id);
        info.time_zone = calendar.time_zone.clone();
        info.summary = calendar.summary.clone();
        Ok(info)
    }

    /// Returns the non-cancelled events intersecting `window`, in stored
    /// order. All-day dates are placed in the calendar's time zone.
    pub fn list(&self, calendar_id: &str, window: &TimeWindow) -> ProviderResult<Vec<RawEvent>> {
        let calendar = self.calendar(calendar_id)?;
        let tz = calendar.tz()?;
        Ok(calendar
            .events
            .iter()
            .filter(|e| !e.is_cancelled())
            .filter(|e| window.overlaps(instant(&e.start, &tz), instant(&e.end, &tz)))
            .cloned()
            .collect())
    }

    /// Stores `event` under a fresh id and returns the stored record.
    pub fn insert(&mut self, calendar_id: &str, mut event: RawEvent) -> ProviderResult<RawEvent> {
        let id = event_id(self.next_id);
        let calendar = self.calendar_mut(calendar_id)?;
        event.id = Some(id);
        calendar.events.push(event.clone());
        self.next_id += 1;
        Ok(event)
    }

    /// Appends `events` to `calendar_id` under fresh ids, creating the
    /// calendar if needed.
    pub fn seed(&mut self, calendar_id: &str, events: impl IntoIterator<Item = RawEvent>) {
        let mut next_id = self.next_id;
        let calendar = self.calendars.entry(calendar_id.to_string()).or_default();
        for mut event in events {
            event.id = Some(event_id(next_id));
            calendar.events.push(event);
            next_id += 1;
        }
        self.next_id = next_id;
    }

    /// Replaces the record `event_id`, keeping its id.
    pub fn update(
        &mut self,
        calendar_id: &str,
        event_id: &str,
        mut event: RawEvent,
    ) -> ProviderResult<RawEvent> {
        let calendar = self.calendar_mut(calendar_id)?;
        let slot = calendar
            .events
            .iter_mut()
            .find(|e| e.id.as_deref() == Some(event_id))
            .ok_or_else(|| ProviderError::event_not_found(calendar_id, event_id))?;
        event.id = Some(event_id.to_string());
        *slot = event.clone();
        Ok(event)
    }

    /// Removes the record `event_id`.
    pub fn delete(&mut self, calendar_id: &str, event_id: &str) -> ProviderResult<()> {
        let calendar = self.calendar_mut(calendar_id)?;
        let before = calendar.events.len();
        calendar.events.retain(|e| e.id.as_deref() != Some(event_id));
        if calendar.events.len() == before {
            return Err(ProviderError::event_not_found(calendar_id, event_id));
        }
        Ok(())
    }

    fn calendar(&self, calendar_id: &str) -> ProviderResult<&StoredCalendar> {
        self.calendars
            .get(calendar_id)
            .ok_or_else(|| calendar_not_found(calendar_id))
    }

    fn calendar_mut(&mut self, calendar_id: &str) -> ProviderResult<&mut StoredCalendar> {
        self.calendars
            .get_mut(calendar_id)
            .ok_or_else(|| calendar_not_found(calendar_id))
    }
}

fn event_id(n: u64) -> String {
    format!("evt-{}", n)
}

fn calendar_not_found(calendar_id: &str) -> ProviderError {
    ProviderError::not_found(format!("calendar {} not found", calendar_id))
}

fn instant(time: &RawEventTime, tz: &Tz) -> DateTime<Utc> {
    match time {
        RawEventTime::DateTime(dt) => *dt,
        RawEventTime::Date(date) => local_to_utc(tz, date.and_time(NaiveTime::MIN)),
    }
}
