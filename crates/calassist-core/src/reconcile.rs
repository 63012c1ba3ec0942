//! Location marker reconciliation.
//!
//! When a new location marker is inserted, every pre-existing marker that
//! intersects it must be deleted or shrunk so that no two markers overlap.
//! [`plan`] computes those edits without touching any calendar; the caller
//! applies them one remote call at a time and records each committed edit
//! in a [`LocationChanges`].
//!
//! Each pre-existing marker `e` is tested against the new marker `[ns, ne)`
//! in a fixed order and receives at most one action:
//!
//! 1. containment, `e.start >= ns && e.end <= ne`: delete `e`
//! 2. tail overlap, `e.start <= ne && e.end > ne`: move `e.start` to `ne`
//! 3. head overlap, `e.start < ns && e.end >= ns`: move `e.end` to `ns`
//!
//! A marker that does not strictly intersect the new one is never touched.
//! A marker that strictly contains the new one matches rule 2; what happens
//! to its head segment is governed by [`ContainmentPolicy`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoreResult;
use crate::event::{Event, EventChanges, EventDraft};

/// What to do with a pre-existing marker that strictly contains the new one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainmentPolicy {
    /// Tail overlap takes precedence: the marker keeps only the part after
    /// the new marker and the part before it is dropped.
    #[default]
    Trim,
    /// The marker keeps the part before the new marker and a second marker
    /// is created for the part after it.
    Split,
}

impl ContainmentPolicy {
    /// Parses a policy name (`trim` or `split`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "trim" => Some(Self::Trim),
            "split" => Some(Self::Split),
            _ => None,
        }
    }
}

/// One edit to a pre-existing marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerAction {
    /// The new marker fully covers `marker`.
    Delete { marker: Event },
    /// `marker` keeps the portion outside the new marker.
    Shrink {
        marker: Event,
        changes: EventChanges,
    },
    /// `marker` keeps its head segment and `tail` is inserted for the
    /// segment after the new marker.
    Split {
        marker: Event,
        changes: EventChanges,
        tail: EventDraft,
    },
}

impl MarkerAction {
    /// Returns a short name for the kind of edit.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Delete { .. } => "delete",
            Self::Shrink { .. } => "shrink",
            Self::Split { .. } => "split",
        }
    }

    /// Returns the pre-existing marker this action applies to.
    pub fn marker(&self) -> &Event {
        match self {
            Self::Delete { marker } | Self::Shrink { marker, .. } | Self::Split { marker, .. } => {
                marker
            }
        }
    }
}

/// The edits needed to make room for a new marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationPlan {
    /// Actions in the order the pre-existing markers were given.
    pub actions: Vec<MarkerAction>,
    /// Pre-existing markers left as they are.
    pub untouched: Vec<Event>,
}

/// Every committed side effect of a location-set operation.
///
/// On failure this holds exactly the edits that reached the calendar before
/// the error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationChanges {
    /// The new marker, followed by any split-off tail markers.
    pub created: Vec<Event>,
    /// Markers removed because the new marker covers them.
    pub deleted: Vec<Event>,
    /// Markers shrunk to the portion outside the new marker (new values).
    pub modified: Vec<Event>,
}

impl LocationChanges {
    /// Returns true if nothing was committed.
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.deleted.is_empty() && self.modified.is_empty()
    }

    /// Returns the number of committed edits.
    pub fn len(&self) -> usize {
        self.created.len() + self.deleted.len() + self.modified.len()
    }
}

/// Computes the edits that keep `existing` markers from overlapping
/// `new_marker`.
///
/// Every interval is validated before anything is planned, so an invalid
/// marker fails the whole operation before any mutation.
pub fn plan(
    new_marker: &Event,
    existing: &[Event],
    policy: ContainmentPolicy,
) -> CoreResult<ReconciliationPlan> {
    new_marker.validate()?;
    for marker in existing {
        marker.validate()?;
    }

    let new_start = &new_marker.start;
    let new_end = &new_marker.end;
    let mut plan = ReconciliationPlan::default();

    for marker in existing {
        if !marker.overlaps(new_marker) {
            plan.untouched.push(marker.clone());
            continue;
        }

        let action = if marker.start >= *new_start && marker.end <= *new_end {
            MarkerAction::Delete {
                marker: marker.clone(),
            }
        } else if marker.start <= *new_end && marker.end > *new_end {
            if marker.start < *new_start && policy == ContainmentPolicy::Split {
                let tail = EventDraft {
                    summary: marker.summary.clone(),
                    start: new_end.clone(),
                    end: marker.end.clone(),
                    transparency: marker.transparency,
                    visibility: marker.visibility,
                };
                MarkerAction::Split {
                    marker: marker.clone(),
                    changes: EventChanges::new().with_end(new_start.clone()),
                    tail,
                }
            } else {
                MarkerAction::Shrink {
                    marker: marker.clone(),
                    changes: EventChanges::new().with_start(new_end.clone()),
                }
            }
        } else if marker.start < *new_start && marker.end >= *new_start {
            MarkerAction::Shrink {
                marker: marker.clone(),
                changes: EventChanges::new().with_end(new_start.clone()),
            }
        } else {
            plan.untouched.push(marker.clone());
            continue;
        };

        debug!(
            marker = %marker.summary,
            start = %marker.start,
            end = %marker.end,
            action = action.kind(),
            "planned marker edit"
        );
        plan.actions.push(action);
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::EventTime;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn marker(id: &str, start: NaiveDate, end: NaiveDate) -> Event {
        EventDraft::location_marker(id, EventTime::from_date(start), EventTime::from_date(end))
            .to_event()
            .with_id(id)
    }

    fn new_marker(start: NaiveDate, end: NaiveDate) -> Event {
        EventDraft::location_marker("New", EventTime::from_date(start), EventTime::from_date(end))
            .to_event()
    }

    #[test]
    fn containment_deletes() {
        let existing = marker("a", date(2018, 10, 18), date(2018, 10, 19));
        let new = new_marker(date(2018, 10, 17), date(2018, 10, 20));

        let plan = plan(&new, &[existing.clone()], ContainmentPolicy::Trim).unwrap();
        assert_eq!(plan.actions, vec![MarkerAction::Delete { marker: existing }]);
        assert!(plan.untouched.is_empty());
    }

    #[test]
    fn identical_range_deletes() {
        let existing = marker("a", date(2018, 10, 17), date(2018, 10, 20));
        let new = new_marker(date(2018, 10, 17), date(2018, 10, 20));

        let plan = plan(&new, &[existing], ContainmentPolicy::Trim).unwrap();
        assert!(matches!(plan.actions[0], MarkerAction::Delete { .. }));
    }

    #[test]
    fn tail_overlap_moves_start() {
        let existing = marker("a", date(2018, 10, 18), date(2018, 10, 22));
        let new = new_marker(date(2018, 10, 16), date(2018, 10, 19));

        let plan = plan(&new, &[existing.clone()], ContainmentPolicy::Trim).unwrap();
        let MarkerAction::Shrink { marker, changes } = &plan.actions[0] else {
            panic!("expected shrink, got {:?}", plan.actions[0]);
        };
        let updated = changes.apply_to(marker);
        assert_eq!(updated.start, EventTime::from_date(date(2018, 10, 19)));
        assert_eq!(updated.end, EventTime::from_date(date(2018, 10, 22)));
        assert_eq!(updated.id, existing.id);
    }

    #[test]
    fn head_overlap_moves_end() {
        let existing = marker("a", date(2018, 10, 15), date(2018, 10, 18));
        let new = new_marker(date(2018, 10, 17), date(2018, 10, 20));

        let plan = plan(&new, &[existing], ContainmentPolicy::Trim).unwrap();
        let MarkerAction::Shrink { marker, changes } = &plan.actions[0] else {
            panic!("expected shrink, got {:?}", plan.actions[0]);
        };
        let updated = changes.apply_to(marker);
        assert_eq!(updated.start, EventTime::from_date(date(2018, 10, 15)));
        assert_eq!(updated.end, EventTime::from_date(date(2018, 10, 17)));
    }

    #[test]
    fn strict_containment_trims_to_tail_by_default() {
        let existing = marker("a", date(2018, 10, 10), date(2018, 10, 25));
        let new = new_marker(date(2018, 10, 17), date(2018, 10, 20));

        let plan = plan(&new, &[existing], ContainmentPolicy::Trim).unwrap();
        let MarkerAction::Shrink { marker, changes } = &plan.actions[0] else {
            panic!("expected shrink, got {:?}", plan.actions[0]);
        };
        let updated = changes.apply_to(marker);
        assert_eq!(updated.start, EventTime::from_date(date(2018, 10, 20)));
        assert_eq!(updated.end, EventTime::from_date(date(2018, 10, 25)));
    }

    #[test]
    fn strict_containment_splits_when_asked() {
        let existing = marker("a", date(2018, 10, 10), date(2018, 10, 25));
        let new = new_marker(date(2018, 10, 17), date(2018, 10, 20));

        let plan = plan(&new, &[existing.clone()], ContainmentPolicy::Split).unwrap();
        let MarkerAction::Split {
            marker,
            changes,
            tail,
        } = &plan.actions[0]
        else {
            panic!("expected split, got {:?}", plan.actions[0]);
        };
        let head = changes.apply_to(marker);
        assert_eq!(head.start, EventTime::from_date(date(2018, 10, 10)));
        assert_eq!(head.end, EventTime::from_date(date(2018, 10, 17)));
        assert_eq!(tail.start, EventTime::from_date(date(2018, 10, 20)));
        assert_eq!(tail.end, EventTime::from_date(date(2018, 10, 25)));
        assert_eq!(tail.summary, existing.summary);
    }

    #[test]
    fn split_policy_leaves_plain_overlaps_alone() {
        let existing = marker("a", date(2018, 10, 18), date(2018, 10, 22));
        let new = new_marker(date(2018, 10, 16), date(2018, 10, 19));

        let plan = plan(&new, &[existing], ContainmentPolicy::Split).unwrap();
        assert!(matches!(plan.actions[0], MarkerAction::Shrink { .. }));
    }

    #[test]
    fn touching_markers_are_untouched() {
        let before = marker("before", date(2018, 10, 15), date(2018, 10, 17));
        let after = marker("after", date(2018, 10, 20), date(2018, 10, 22));
        let new = new_marker(date(2018, 10, 17), date(2018, 10, 20));

        let plan = plan(&new, &[before.clone(), after.clone()], ContainmentPolicy::Trim).unwrap();
        assert!(plan.actions.is_empty());
        assert_eq!(plan.untouched, vec![before, after]);
    }

    #[test]
    fn mixed_overlaps_keep_input_order() {
        let head = marker("head", date(2018, 10, 15), date(2018, 10, 18));
        let inside = marker("inside", date(2018, 10, 18), date(2018, 10, 19));
        let tail = marker("tail", date(2018, 10, 19), date(2018, 10, 22));
        let new = new_marker(date(2018, 10, 17), date(2018, 10, 20));

        let plan = plan(&new, &[head, inside, tail], ContainmentPolicy::Trim).unwrap();
        let ids: Vec<_> = plan
            .actions
            .iter()
            .map(|a| a.marker().id.clone().unwrap())
            .collect();
        assert_eq!(ids, vec!["head", "inside", "tail"]);
        assert!(matches!(plan.actions[1], MarkerAction::Delete { .. }));
    }

    #[test]
    fn invalid_interval_fails_before_planning() {
        let broken = marker("broken", date(2018, 10, 19), date(2018, 10, 18));
        let new = new_marker(date(2018, 10, 17), date(2018, 10, 20));
        let err = plan(&new, &[broken], ContainmentPolicy::Trim).unwrap_err();
        assert!(err.is_invalid_interval());

        let empty_new = new_marker(date(2018, 10, 17), date(2018, 10, 17));
        assert!(plan(&empty_new, &[], ContainmentPolicy::Trim).is_err());
    }

    #[test]
    fn policy_parse() {
        assert_eq!(ContainmentPolicy::parse("Split"), Some(ContainmentPolicy::Split));
        assert_eq!(ContainmentPolicy::parse("trim"), Some(ContainmentPolicy::Trim));
        assert_eq!(ContainmentPolicy::parse("merge"), None);
        assert_eq!(ContainmentPolicy::default(), ContainmentPolicy::Trim);
    }

    #[test]
    fn location_changes_counts() {
        let mut changes = LocationChanges::default();
        assert!(changes.is_empty());
        changes.created.push(new_marker(date(2018, 10, 17), date(2018, 10, 20)));
        changes
            .deleted
            .push(marker("a", date(2018, 10, 18), date(2018, 10, 19)));
        assert_eq!(changes.len(), 2);
    }
}
