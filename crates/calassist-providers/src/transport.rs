//! The calendar transport capability.
//!
//! A [`CalendarTransport`] is the only thing that talks to where events are
//! stored: a remote service client, the local JSON store or the in-memory
//! fake. It deals in [`RawEvent`]s and knows nothing about markers,
//! classification or availability.

use std::future::Future;
use std::pin::Pin;

use calassist_core::TimeWindow;

use crate::error::{ProviderError, ProviderResult};
use crate::raw_event::RawEvent;

/// Identity and time zone of one calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarInfo {
    pub id: String,
    /// IANA time zone name, if the calendar has one.
    pub time_zone: Option<String>,
    pub summary: Option<String>,
}

impl CalendarInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            time_zone: None,
            summary: None,
        }
    }

    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = Some(time_zone.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

/// A boxed future so that [`CalendarTransport`] stays object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Raw access to a calendar store.
///
/// Every call is one round trip; implementations hold no write-back cache.
/// Callers await calls one at a time. Failures are returned as they happen
/// and are never retried here.
pub trait CalendarTransport: Send + Sync {
    /// Short name used in logs and error messages (`memory`, `local`).
    fn name(&self) -> &str;

    /// Looks up a calendar's id and time zone.
    fn get_calendar<'a>(&'a self, calendar_id: &'a str)
        -> BoxFuture<'a, ProviderResult<CalendarInfo>>;

    /// Lists non-cancelled events intersecting `window`, each recurring
    /// instance as its own record.
    fn list_events<'a>(
        &'a self,
        calendar_id: &'a str,
        window: TimeWindow,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>>;

    /// Stores a new event and returns it with its assigned id.
    fn insert_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event: RawEvent,
    ) -> BoxFuture<'a, ProviderResult<RawEvent>>;

    /// Replaces the event `event_id`.
    ///
    /// Fails with a not-found error if the id is unknown.
    fn update_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
        event: RawEvent,
    ) -> BoxFuture<'a, ProviderResult<RawEvent>>;

    /// Removes the event `event_id`.
    ///
    /// Fails with a not-found error if the id is unknown.
    fn delete_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<()>>;
}

/// A transport whose every call fails with the same error.
///
/// Stands in for a backend that could not be configured.
#[derive(Debug)]
pub struct ErrorTransport {
    name: String,
    error: ProviderError,
}

impl ErrorTransport {
    pub fn new(name: impl Into<String>, error: ProviderError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }

    fn fail<T: Send + 'static>(&self) -> BoxFuture<'static, ProviderResult<T>> {
        // ProviderError is not Clone; rebuild it from its parts.
        let error =
            ProviderError::new(self.error.code(), self.error.message()).with_provider(&self.name);
        Box::pin(async move { Err(error) })
    }
}

impl CalendarTransport for ErrorTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_calendar<'a>(
        &'a self,
        _calendar_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<CalendarInfo>> {
        self.fail()
    }

    fn list_events<'a>(
        &'a self,
        _calendar_id: &'a str,
        _window: TimeWindow,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>> {
        self.fail()
    }

    fn insert_event<'a>(
        &'a self,
        _calendar_id: &'a str,
        _event: RawEvent,
    ) -> BoxFuture<'a, ProviderResult<RawEvent>> {
        self.fail()
    }

    fn update_event<'a>(
        &'a self,
        _calendar_id: &'a str,
        _event_id: &'a str,
        _event: RawEvent,
    ) -> BoxFuture<'a, ProviderResult<RawEvent>> {
        self.fail()
    }

    fn delete_event<'a>(
        &'a self,
        _calendar_id: &'a str,
        _event_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        self.fail()
    }
}
