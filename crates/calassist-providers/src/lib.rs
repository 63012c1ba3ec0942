//! Calendar transports and the event repository.
//!
//! - [`CalendarTransport`] - raw capability every backend implements
//! - [`RawEvent`] - the wire record a transport stores
//! - [`normalize_event`] - wire record to [`calassist_core::Event`]
//! - [`EventRepository`] - model-level find/create/update/delete on one calendar
//! - [`RepositoryRegistry`] - caller-owned map of repositories by calendar id
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────────────┐
//! │ MemoryTransport  │   │ LocalStoreTransport  │
//! └────────┬─────────┘   └──────────┬───────────┘
//!          │   CalendarTransport    │
//!          └───────────┬────────────┘
//!                      │ RawEvent
//!                      ▼
//!             ┌──────────────────┐
//!             │ EventRepository  │  normalize_event()
//!             └────────┬─────────┘
//!                      ▼
//!                    Event
//! ```

pub mod error;
pub mod local;
pub mod memory;
pub mod normalize;
pub mod raw_event;
pub mod repository;
pub mod store;
pub mod transport;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use local::LocalStoreTransport;
pub use memory::MemoryTransport;
pub use normalize::{draft_to_raw, event_to_raw, normalize_event, normalize_events};
pub use raw_event::{RawAttendee, RawEvent, RawEventTime};
pub use repository::{EventRepository, RepositoryRegistry};
pub use store::{CalendarStore, StoredCalendar};
pub use transport::{BoxFuture, CalendarInfo, CalendarTransport, ErrorTransport};
