//! Transport backed by a JSON file on disk.
//!
//! The file holds a [`CalendarStore`]. It is read at the start of every
//! call and written back after every mutation, so concurrent processes see
//! each other's changes between calls (but are not otherwise coordinated).
//! A missing file is an empty store, and a calendar id that is not yet in
//! the file is treated as an empty calendar in UTC.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use calassist_core::TimeWindow;
use tracing::{debug, trace};

use crate::error::{ProviderError, ProviderResult};
use crate::raw_event::RawEvent;
use crate::store::CalendarStore;
use crate::transport::{BoxFuture, CalendarInfo, CalendarTransport};

const NAME: &str = "local";

/// A transport that persists calendars to a JSON file.
#[derive(Debug, Clone)]
pub struct LocalStoreTransport {
    path: PathBuf,
}

impl LocalStoreTransport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the store, returning an empty one if the file does not exist.
    pub fn load(&self) -> ProviderResult<CalendarStore> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                trace!(path = %self.path.display(), "local store missing, starting empty");
                return Ok(CalendarStore::new());
            }
            Err(e) => {
                return Err(ProviderError::storage(format!(
                    "failed to read {}",
                    self.path.display()
                ))
                .with_provider(NAME)
                .with_source(e));
            }
        };

        serde_json::from_str(&content).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse {}", self.path.display()))
                .with_provider(NAME)
                .with_source(e)
        })
    }

    /// Writes the store through a temporary file in the same directory.
    pub fn save(&self, store: &CalendarStore) -> ProviderResult<()> {
        let content = serde_json::to_string_pretty(store).map_err(|e| {
            ProviderError::internal("failed to serialize local store")
                .with_provider(NAME)
                .with_source(e)
        })?;

        let write_failed = |e: io::Error| {
            ProviderError::storage(format!("failed to write {}", self.path.display()))
                .with_provider(NAME)
                .with_source(e)
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_failed)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(write_failed)?;
        fs::rename(&tmp, &self.path).map_err(write_failed)?;
        debug!(path = %self.path.display(), "saved local store");
        Ok(())
    }

    fn read<T, F>(&self, calendar_id: &str, op: F) -> ProviderResult<T>
    where
        F: FnOnce(&CalendarStore) -> ProviderResult<T>,
    {
        let mut store = self.load()?;
        store.add_calendar(calendar_id, None);
        op(&store).map_err(|e| e.with_provider(NAME))
    }

    fn write<T, F>(&self, calendar_id: &str, op: F) -> ProviderResult<T>
    where
        F: FnOnce(&mut CalendarStore) -> ProviderResult<T>,
    {
        let mut store = self.load()?;
        store.add_calendar(calendar_id, None);
        let result = op(&mut store).map_err(|e| e.with_provider(NAME))?;
        self.save(&store)?;
        Ok(result)
    }
}

impl CalendarTransport for LocalStoreTransport {
    fn name(&self) -> &str {
        NAME
    }

    fn get_calendar<'a>(
        &'a self,
        calendar_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<CalendarInfo>> {
        Box::pin(async move { self.read(calendar_id, |store| store.calendar_info(calendar_id)) })
    }

    fn list_events<'a>(
        &'a self,
        calendar_id: &'a str,
        window: TimeWindow,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>> {
        Box::pin(async move { self.read(calendar_id, |store| store.list(calendar_id, &window)) })
    }

    fn insert_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event: RawEvent,
    ) -> BoxFuture<'a, ProviderResult<RawEvent>> {
        Box::pin(async move { self.write(calendar_id, |store| store.insert(calendar_id, event)) })
    }

    fn update_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
        event: RawEvent,
    ) -> BoxFuture<'a, ProviderResult<RawEvent>> {
        Box::pin(async move {
            self.write(calendar_id, |store| store.update(calendar_id, event_id, event))
        })
    }

    fn delete_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move { self.write(calendar_id, |store| store.delete(calendar_id, event_id)) })
    }
}
