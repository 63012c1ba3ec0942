//! Event repository: model-level access to one calendar.
//!
//! An [`EventRepository`] wraps a [`CalendarTransport`] for a single
//! calendar id. It maps raw records to [`Event`]s, orders results and logs
//! every round trip. It keeps no cache; each call reaches the transport.
//!
//! A [`RepositoryRegistry`] owned by the caller hands out one repository
//! per calendar id, resolving each calendar only once per run.

use std::collections::HashMap;
use std::sync::Arc;

use calassist_core::{Event, EventChanges, EventDraft, TimeWindow};
use chrono_tz::Tz;
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};
use crate::normalize::{draft_to_raw, event_to_raw, normalize_event, normalize_events};
use crate::transport::CalendarTransport;

/// Reads and writes events of one calendar.
pub struct EventRepository {
    transport: Arc<dyn CalendarTransport>,
    calendar_id: String,
    time_zone: Tz,
}

impl std::fmt::Debug for EventRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRepository")
            .field("transport", &self.transport.name())
            .field("calendar_id", &self.calendar_id)
            .field("time_zone", &self.time_zone)
            .finish()
    }
}

impl EventRepository {
    /// Resolves `calendar_id` through the transport and opens a repository
    /// for it. A calendar without a time zone is treated as UTC.
    pub async fn open(
        transport: Arc<dyn CalendarTransport>,
        calendar_id: &str,
    ) -> ProviderResult<Self> {
        let info = transport.get_calendar(calendar_id).await?;
        let time_zone = match info.time_zone {
            Some(ref name) => name.parse::<Tz>().map_err(|_| {
                ProviderError::invalid_response(format!(
                    "calendar {} has unknown time zone '{}'",
                    info.id, name
                ))
                .with_provider(transport.name())
            })?,
            None => Tz::UTC,
        };
        debug!(
            transport = transport.name(),
            calendar_id = %info.id,
            %time_zone,
            "opened calendar"
        );
        Ok(Self {
            transport,
            calendar_id: info.id,
            time_zone,
        })
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    /// The calendar's own time zone, used to place all-day events.
    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    /// Returns the events intersecting `window`, ordered by start.
    pub async fn find(&self, window: &TimeWindow) -> ProviderResult<Vec<Event>> {
        let raw = self
            .transport
            .list_events(&self.calendar_id, *window)
            .await?;
        let mut events = normalize_events(&raw);
        let tz = self.time_zone;
        events.sort_by_key(|e| e.interval_in(&tz));
        debug!(
            calendar_id = %self.calendar_id,
            start = %window.start,
            end = %window.end,
            count = events.len(),
            "found events"
        );
        Ok(events)
    }

    /// Creates an event and returns it with its assigned id.
    pub async fn create(&self, draft: &EventDraft) -> ProviderResult<Event> {
        let raw = self
            .transport
            .insert_event(&self.calendar_id, draft_to_raw(draft))
            .await?;
        let event = normalize_event(&raw);
        info!(
            calendar_id = %self.calendar_id,
            event_id = event.id.as_deref().unwrap_or_default(),
            summary = %event.summary,
            "created event"
        );
        Ok(event)
    }

    /// Applies `changes` to the stored `event` and returns the new value.
    pub async fn update(&self, event: &Event, changes: &EventChanges) -> ProviderResult<Event> {
        let id = require_id(event)?;
        let updated = changes.apply_to(event);
        let raw = self
            .transport
            .update_event(&self.calendar_id, id, event_to_raw(&updated))
            .await?;
        let event = normalize_event(&raw);
        info!(
            calendar_id = %self.calendar_id,
            event_id = id,
            start = %event.start,
            end = %event.end,
            "updated event"
        );
        Ok(event)
    }

    /// Deletes the stored `event`.
    pub async fn delete(&self, event: &Event) -> ProviderResult<()> {
        let id = require_id(event)?;
        self.transport.delete_event(&self.calendar_id, id).await?;
        info!(calendar_id = %self.calendar_id, event_id = id, "deleted event");
        Ok(())
    }
}

fn require_id(event: &Event) -> ProviderResult<&str> {
    event.id.as_deref().ok_or_else(|| {
        ProviderError::bad_request(format!("event '{}' has no id", event.summary))
    })
}

/// One repository per calendar id, built on first use.
pub struct RepositoryRegistry {
    transport: Arc<dyn CalendarTransport>,
    repositories: HashMap<String, Arc<EventRepository>>,
}

impl RepositoryRegistry {
    pub fn new(transport: Arc<dyn CalendarTransport>) -> Self {
        Self {
            transport,
            repositories: HashMap::new(),
        }
    }

    /// Returns the repository for `calendar_id`, opening it if needed.
    pub async fn get(&mut self, calendar_id: &str) -> ProviderResult<Arc<EventRepository>> {
        if let Some(repository) = self.repositories.get(calendar_id) {
            return Ok(Arc::clone(repository));
        }
        let repository =
            Arc::new(EventRepository::open(Arc::clone(&self.transport), calendar_id).await?);
        self.repositories
            .insert(calendar_id.to_string(), Arc::clone(&repository));
        Ok(repository)
    }

    /// Number of calendars opened so far.
    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }
}
