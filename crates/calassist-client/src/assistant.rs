//! The calendar assistant: ties the repository to the reconciler and the
//! scheduler for one calendar.
//!
//! Every operation takes its time zone and workday bounds from the
//! [`SchedulingContext`] held by the assistant; nothing reads or changes
//! process-wide state.

use std::sync::Arc;

use calassist_core::{
    available_days, busy_events, classify, plan, Attribute, CallLink, ContainmentPolicy,
    DayAvailability, Event, EventDraft, EventTime, LocationChanges, MarkerAction,
    SchedulingContext, TimeWindow,
};
use calassist_providers::{EventRepository, ProviderResult};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::{AssistantError, AssistantResult};
use crate::parse::DateSpec;

/// How many minutes past the requested moment a meeting may start and
/// still be joined.
pub const JOIN_LOOKAHEAD_MINUTES: i64 = 5;

/// A meeting and the call link to join it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCall {
    pub event: Event,
    pub link: CallLink,
}

/// Calendar operations for one calendar.
#[derive(Debug, Clone)]
pub struct CalendarAssistant {
    repository: Arc<EventRepository>,
    context: SchedulingContext,
    policy: ContainmentPolicy,
}

impl CalendarAssistant {
    pub fn new(
        repository: Arc<EventRepository>,
        context: SchedulingContext,
        policy: ContainmentPolicy,
    ) -> Self {
        Self {
            repository,
            context,
            policy,
        }
    }

    /// Builds the assistant from merged settings. The configured time zone
    /// wins over the calendar's own.
    pub fn from_settings(
        repository: Arc<EventRepository>,
        settings: &Settings,
    ) -> AssistantResult<Self> {
        let time_zone = settings
            .time_zone()?
            .unwrap_or_else(|| repository.time_zone());
        let context = SchedulingContext::new(time_zone, settings.workday()?);
        Ok(Self::new(repository, context, settings.containment))
    }

    pub fn context(&self) -> &SchedulingContext {
        &self.context
    }

    pub fn time_zone(&self) -> Tz {
        self.context.time_zone
    }

    /// The identity used to find the user among attendees.
    pub fn self_identity(&self) -> &str {
        self.repository.calendar_id()
    }

    /// The local date of `now` in the assistant's time zone.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.context.time_zone).date_naive()
    }

    /// Returns every event on the dates of `spec`, ordered by start.
    pub async fn find_events(&self, spec: &DateSpec) -> AssistantResult<Vec<Event>> {
        let window = spec.window(&self.context.time_zone);
        Ok(self.repository.find(&window).await?)
    }

    /// Returns the location markers on the dates of `spec`.
    pub async fn find_location_events(&self, spec: &DateSpec) -> AssistantResult<Vec<Event>> {
        let mut events = self.find_events(spec).await?;
        events.retain(Event::is_location_marker);
        Ok(events)
    }

    /// Creates a marker for `location` covering every date of `spec`, then
    /// deletes or shrinks the markers it overlaps.
    ///
    /// All intervals are validated before the first write. If a transport
    /// call fails after the marker was created, the error carries the edits
    /// that had already committed; nothing is rolled back.
    pub async fn create_location_event(
        &self,
        spec: &DateSpec,
        location: &str,
    ) -> AssistantResult<LocationChanges> {
        let location = location.trim();
        if location.is_empty() {
            return Err(AssistantError::parse("location", location));
        }

        let draft = EventDraft::location_marker(
            location,
            EventTime::from_date(spec.first),
            EventTime::from_date(spec.end_exclusive()),
        );
        let candidate = draft.to_event();
        candidate.validate()?;

        let existing = self.find_location_events(spec).await?;
        let plan = plan(&candidate, &existing, self.policy)?;
        debug!(
            location,
            existing = existing.len(),
            actions = plan.actions.len(),
            untouched = plan.untouched.len(),
            "planned location change"
        );

        let mut committed = LocationChanges::default();
        committed.created.push(self.repository.create(&draft).await?);

        for action in &plan.actions {
            if let Err(source) = self.apply(action, &mut committed).await {
                warn!(
                    marker = %action.marker().summary,
                    action = action.kind(),
                    committed = committed.len(),
                    error = %source,
                    "location change interrupted"
                );
                return Err(AssistantError::PartialReconciliation { committed, source });
            }
        }

        info!(
            location,
            created = committed.created.len(),
            deleted = committed.deleted.len(),
            modified = committed.modified.len(),
            "location set"
        );
        Ok(committed)
    }

    async fn apply(
        &self,
        action: &MarkerAction,
        committed: &mut LocationChanges,
    ) -> ProviderResult<()> {
        match action {
            MarkerAction::Delete { marker } => {
                self.repository.delete(marker).await?;
                committed.deleted.push(marker.clone());
            }
            MarkerAction::Shrink { marker, changes } => {
                let updated = self.repository.update(marker, changes).await?;
                committed.modified.push(updated);
            }
            MarkerAction::Split {
                marker,
                changes,
                tail,
            } => {
                let updated = self.repository.update(marker, changes).await?;
                committed.modified.push(updated);
                let created = self.repository.create(tail).await?;
                committed.created.push(created);
            }
        }
        Ok(())
    }

    /// Finds the meeting to join at `at`: a timed event with a video-call
    /// link that is running then or starts within
    /// [`JOIN_LOOKAHEAD_MINUTES`]. Declined meetings are skipped. Accepted
    /// meetings beat tentative ones, which beat unanswered ones; among
    /// equals the latest start wins.
    pub async fn find_video_call(&self, at: DateTime<Utc>) -> AssistantResult<Option<VideoCall>> {
        let end = at
            .checked_add_signed(Duration::minutes(JOIN_LOOKAHEAD_MINUTES))
            .ok_or_else(|| AssistantError::parse("moment", at.to_rfc3339()))?;
        let window = TimeWindow::try_new(at, end)?;
        let events = self.repository.find(&window).await?;
        let identity = self.self_identity();

        let call = events
            .into_iter()
            .filter(|event| !event.is_all_day())
            .filter_map(|event| {
                let rank = response_rank(&event, identity)?;
                let link = event.video_call()?;
                Some((rank, event, link))
            })
            .min_by(|(a_rank, a, _), (b_rank, b, _)| {
                a_rank.cmp(b_rank).then_with(|| b.start.cmp(&a.start))
            })
            .map(|(_, event, link)| VideoCall { event, link });

        debug!(
            at = %at,
            found = call.as_ref().map(|c| c.event.summary.as_str()),
            "looked up video call"
        );
        Ok(call)
    }

    /// Returns the free blocks of at least `min_duration` on each date of
    /// `spec`, inside the workday bounds.
    pub async fn availability(
        &self,
        spec: &DateSpec,
        min_duration: Duration,
    ) -> AssistantResult<Vec<DayAvailability>> {
        let window = spec.window(&self.context.time_zone);
        let events = self.repository.find(&window).await?;
        let busy = busy_events(&events, self.self_identity());
        debug!(
            events = events.len(),
            busy = busy.len(),
            "collected busy events"
        );
        Ok(available_days(&window, &busy, &self.context, min_duration)?)
    }
}

/// Lower is preferred; `None` for declined meetings.
fn response_rank(event: &Event, self_identity: &str) -> Option<u8> {
    let attributes = classify(event, self_identity);
    if attributes.contains(Attribute::Declined) {
        None
    } else if attributes.contains_any(&[Attribute::Accepted, Attribute::SelfOnly]) {
        Some(0)
    } else if attributes.contains(Attribute::Tentative) {
        Some(1)
    } else {
        Some(2)
    }
}
