//! In-process transport backed by a [`CalendarStore`].

use std::sync::{Mutex, MutexGuard};

use calassist_core::TimeWindow;
use tracing::trace;

use crate::error::{ProviderError, ProviderResult};
use crate::raw_event::RawEvent;
use crate::store::CalendarStore;
use crate::transport::{BoxFuture, CalendarInfo, CalendarTransport};

const NAME: &str = "memory";

/// A transport that keeps every calendar in memory.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    store: Mutex<CalendarStore>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport over an existing store.
    pub fn from_store(store: CalendarStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    /// Builder method to add an empty calendar.
    pub fn with_calendar(self, calendar_id: &str, time_zone: Option<&str>) -> Self {
        if let Ok(mut store) = self.store.lock() {
            store.add_calendar(calendar_id, time_zone.map(String::from));
        }
        self
    }

    /// Builder method to seed a calendar with records.
    ///
    /// Records are stored with fresh ids, in the given order.
    pub fn with_events(self, calendar_id: &str, events: Vec<RawEvent>) -> Self {
        if let Ok(mut store) = self.store.lock() {
            store.seed(calendar_id, events);
        }
        self
    }

    /// Returns a copy of the current store contents.
    pub fn snapshot(&self) -> ProviderResult<CalendarStore> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> ProviderResult<MutexGuard<'_, CalendarStore>> {
        self.store
            .lock()
            .map_err(|_| ProviderError::internal("memory store lock poisoned").with_provider(NAME))
    }

    fn run<T, F>(&self, op: F) -> ProviderResult<T>
    where
        F: FnOnce(&mut CalendarStore) -> ProviderResult<T>,
    {
        let mut store = self.lock()?;
        op(&mut store).map_err(|e| e.with_provider(NAME))
    }
}

impl CalendarTransport for MemoryTransport {
    fn name(&self) -> &str {
        NAME
    }

    fn get_calendar<'a>(
        &'a self,
        calendar_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<CalendarInfo>> {
        Box::pin(async move { self.run(|store| store.calendar_info(calendar_id)) })
    }

    fn list_events<'a>(
        &'a self,
        calendar_id: &'a str,
        window: TimeWindow,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>> {
        Box::pin(async move {
            let events = self.run(|store| store.list(calendar_id, &window))?;
            trace!(calendar_id, count = events.len(), "listed events");
            Ok(events)
        })
    }

    fn insert_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event: RawEvent,
    ) -> BoxFuture<'a, ProviderResult<RawEvent>> {
        Box::pin(async move { self.run(|store| store.insert(calendar_id, event)) })
    }

    fn update_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
        event: RawEvent,
    ) -> BoxFuture<'a, ProviderResult<RawEvent>> {
        Box::pin(async move { self.run(|store| store.update(calendar_id, event_id, event)) })
    }

    fn delete_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move { self.run(|store| store.delete(calendar_id, event_id)) })
    }
}
