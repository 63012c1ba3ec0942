//! Core types and algorithms: events, attributes, marker reconciliation,
//! availability, video-call links and formatting

pub mod attributes;
pub mod availability;
pub mod error;
pub mod event;
pub mod format;
pub mod links;
pub mod reconcile;
pub mod time;
pub mod tracing;

pub use attributes::{classify, is_busy, Attribute, AttributeSet};
pub use availability::{
    available_blocks, available_days, busy_events, AvailabilityBlock, DayAvailability,
    SchedulingContext, WorkdayBounds,
};
pub use error::{CoreError, CoreResult};
pub use event::{
    Attendee, Event, EventChanges, EventDraft, ResponseStatus, Transparency, Visibility,
    EMOJI_WORLDMAP,
};
pub use format::{
    event_date_description, event_line, format_availability, format_duration, format_events,
    format_events_at, format_location_changes, json_events, JsonEvent,
};
pub use links::{find_call_links, parse_call_link, CallLink, CallService};
pub use reconcile::{plan, ContainmentPolicy, LocationChanges, MarkerAction, ReconciliationPlan};
pub use time::{local_to_utc, EventTime, TimeWindow};
pub use tracing::{init_tracing, TracingConfig, TracingError, TracingOutputFormat};
