//! Semantic event attributes.
//!
//! [`classify`] derives an [`AttributeSet`] from an [`Event`] and the
//! identity of the calendar owner. Rules only ever add attributes:
//!
//! 1. transparent events are `not-busy`
//! 2. no attendees means `self`; otherwise the owner's response is added
//! 3. instances of a series are `recurring`
//! 4. an owner response of accepted, tentative or needs-action with other
//!    attendees present is a `commitment`
//! 5. exactly two attendees is a `one-on-one`
//! 6. a non-default visibility adds its own name

use std::fmt;

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use crate::event::{Event, ResponseStatus, Transparency, Visibility};

/// A single semantic attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Attribute {
    Recurring,
    NotBusy,
    SelfOnly,
    OneOnOne,
    Commitment,
    Accepted,
    Declined,
    Tentative,
    NeedsAction,
    Awaiting,
    Public,
    Private,
    Confidential,
}

impl Attribute {
    /// Every attribute, in declaration order.
    pub const ALL: [Attribute; 13] = [
        Self::Recurring,
        Self::NotBusy,
        Self::SelfOnly,
        Self::OneOnOne,
        Self::Commitment,
        Self::Accepted,
        Self::Declined,
        Self::Tentative,
        Self::NeedsAction,
        Self::Awaiting,
        Self::Public,
        Self::Private,
        Self::Confidential,
    ];

    /// Returns the display name of this attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recurring => "recurring",
            Self::NotBusy => "not-busy",
            Self::SelfOnly => "self",
            Self::OneOnOne => "one-on-one",
            Self::Commitment => "commitment",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Tentative => "tentative",
            Self::NeedsAction => "needs-action",
            Self::Awaiting => "awaiting",
            Self::Public => "public",
            Self::Private => "private",
            Self::Confidential => "confidential",
        }
    }

    /// Returns the attribute for a response status, if it has one.
    pub fn from_response(status: ResponseStatus) -> Option<Self> {
        match status {
            ResponseStatus::Accepted => Some(Self::Accepted),
            ResponseStatus::Declined => Some(Self::Declined),
            ResponseStatus::Tentative => Some(Self::Tentative),
            ResponseStatus::NeedsAction => Some(Self::NeedsAction),
            ResponseStatus::Unknown => None,
        }
    }

    /// Returns the attribute for a non-default visibility.
    pub fn from_visibility(visibility: Visibility) -> Option<Self> {
        match visibility {
            Visibility::Default => None,
            Visibility::Public => Some(Self::Public),
            Visibility::Private => Some(Self::Private),
            Visibility::Confidential => Some(Self::Confidential),
        }
    }

    fn bit(self) -> u16 {
        1 << (self as u8)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fixed-size set of [`Attribute`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AttributeSet(u16);

impl AttributeSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self(0)
    }

    /// Adds an attribute.
    pub fn insert(&mut self, attribute: Attribute) {
        self.0 |= attribute.bit();
    }

    /// Removes an attribute, returning whether it was present.
    pub fn remove(&mut self, attribute: Attribute) -> bool {
        let present = self.contains(attribute);
        self.0 &= !attribute.bit();
        present
    }

    /// Returns true if the attribute is present.
    pub fn contains(&self, attribute: Attribute) -> bool {
        self.0 & attribute.bit() != 0
    }

    /// Returns true if any of the given attributes is present.
    pub fn contains_any(&self, attributes: &[Attribute]) -> bool {
        attributes.iter().any(|a| self.contains(*a))
    }

    /// Returns the number of attributes in the set.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns true if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterates over the attributes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Attribute> + '_ {
        Attribute::ALL.into_iter().filter(|a| self.contains(*a))
    }

    /// Returns the attribute names sorted alphabetically.
    pub fn sorted_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.iter().map(|a| a.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl FromIterator<Attribute> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        let mut set = Self::new();
        for attribute in iter {
            set.insert(attribute);
        }
        set
    }
}

impl fmt::Display for AttributeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sorted_names().join(", "))
    }
}

impl Serialize for AttributeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let names = self.sorted_names();
        let mut seq = serializer.serialize_seq(Some(names.len()))?;
        for name in names {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}

/// Derives the semantic attributes of `event` as seen by `self_identity`
/// (the calendar owner's id or email).
pub fn classify(event: &Event, self_identity: &str) -> AttributeSet {
    let mut attributes = AttributeSet::new();

    if event.transparency == Transparency::Transparent {
        attributes.insert(Attribute::NotBusy);
    }

    if event.attendees.is_empty() {
        attributes.insert(Attribute::SelfOnly);
    } else if let Some(response) = event
        .attendee(self_identity)
        .and_then(|a| Attribute::from_response(a.response_status))
    {
        attributes.insert(response);
    }

    if event.recurring_event_id.is_some() {
        attributes.insert(Attribute::Recurring);
    }

    if !event.attendees.is_empty()
        && attributes.contains_any(&[
            Attribute::Accepted,
            Attribute::Tentative,
            Attribute::NeedsAction,
        ])
    {
        attributes.insert(Attribute::Commitment);
    }

    if event.attendees.len() == 2 {
        attributes.insert(Attribute::OneOnOne);
    }

    if let Some(visibility) = Attribute::from_visibility(event.visibility) {
        attributes.insert(visibility);
    }

    attributes
}

/// Returns true if `event` blocks time for `self_identity`.
pub fn is_busy(event: &Event, self_identity: &str) -> bool {
    !classify(event, self_identity).contains(Attribute::NotBusy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Attendee;
    use crate::time::EventTime;
    use chrono::{TimeZone, Utc};

    const ME: &str = "me@example.com";

    fn meeting() -> Event {
        Event::new(
            "Meeting",
            EventTime::from_utc(Utc.with_ymd_and_hms(2018, 10, 18, 9, 0, 0).unwrap()),
            EventTime::from_utc(Utc.with_ymd_and_hms(2018, 10, 18, 10, 0, 0).unwrap()),
        )
    }

    fn with_me(status: ResponseStatus) -> Event {
        meeting()
            .with_attendee(Attendee::new(ME, status))
            .with_attendee(Attendee::new("you@example.com", ResponseStatus::Accepted))
    }

    mod attribute_set {
        use super::*;

        #[test]
        fn insert_remove_contains() {
            let mut set = AttributeSet::new();
            assert!(set.is_empty());
            set.insert(Attribute::Declined);
            set.insert(Attribute::Recurring);
            set.insert(Attribute::Recurring);
            assert_eq!(set.len(), 2);
            assert!(set.contains(Attribute::Declined));
            assert!(set.remove(Attribute::Declined));
            assert!(!set.remove(Attribute::Declined));
            assert_eq!(set.len(), 1);
        }

        #[test]
        fn display_is_sorted() {
            let set: AttributeSet = [Attribute::SelfOnly, Attribute::NotBusy, Attribute::Recurring]
                .into_iter()
                .collect();
            assert_eq!(set.to_string(), "not-busy, recurring, self");
        }

        #[test]
        fn serializes_as_names() {
            let set: AttributeSet = [Attribute::OneOnOne, Attribute::Accepted].into_iter().collect();
            assert_eq!(
                serde_json::to_string(&set).unwrap(),
                r#"["accepted","one-on-one"]"#
            );
        }
    }

    mod classify {
        use super::*;

        #[test]
        fn self_only_event() {
            let attrs = classify(&meeting(), ME);
            assert_eq!(attrs, [Attribute::SelfOnly].into_iter().collect());
        }

        #[test]
        fn transparent_is_not_busy() {
            let event = meeting().with_transparency(Transparency::Transparent);
            let attrs = classify(&event, ME);
            assert!(attrs.contains(Attribute::NotBusy));
            assert!(!is_busy(&event, ME));
            assert!(is_busy(&meeting(), ME));
        }

        #[test]
        fn accepted_one_on_one_is_commitment() {
            let attrs = classify(&with_me(ResponseStatus::Accepted), ME);
            assert!(attrs.contains(Attribute::Accepted));
            assert!(attrs.contains(Attribute::Commitment));
            assert!(attrs.contains(Attribute::OneOnOne));
            assert!(!attrs.contains(Attribute::SelfOnly));
        }

        #[test]
        fn tentative_and_needs_action_are_commitments() {
            for status in [ResponseStatus::Tentative, ResponseStatus::NeedsAction] {
                let attrs = classify(&with_me(status), ME);
                assert!(attrs.contains(Attribute::Commitment), "{:?}", status);
            }
        }

        #[test]
        fn declined_is_not_commitment() {
            let attrs = classify(&with_me(ResponseStatus::Declined), ME);
            assert!(attrs.contains(Attribute::Declined));
            assert!(!attrs.contains(Attribute::Commitment));
        }

        #[test]
        fn unknown_owner_adds_no_status() {
            let event = meeting()
                .with_attendee(Attendee::new("a@example.com", ResponseStatus::Accepted))
                .with_attendee(Attendee::new("b@example.com", ResponseStatus::Accepted))
                .with_attendee(Attendee::new("c@example.com", ResponseStatus::Accepted));
            let attrs = classify(&event, ME);
            assert!(attrs.is_empty());
        }

        #[test]
        fn is_self_flag_identifies_owner() {
            let mut me = Attendee::new("alias@example.com", ResponseStatus::Tentative);
            me.is_self = true;
            let event = meeting().with_attendee(me);
            let attrs = classify(&event, ME);
            assert!(attrs.contains(Attribute::Tentative));
            assert!(attrs.contains(Attribute::Commitment));
            assert!(!attrs.contains(Attribute::OneOnOne));
        }

        #[test]
        fn recurring_and_visibility() {
            let event = meeting()
                .with_recurring("series-1")
                .with_visibility(Visibility::Private);
            let attrs = classify(&event, ME);
            assert!(attrs.contains(Attribute::Recurring));
            assert!(attrs.contains(Attribute::Private));
            assert!(attrs.contains(Attribute::SelfOnly));

            let default = classify(&meeting().with_visibility(Visibility::Default), ME);
            assert!(!default.contains_any(&[
                Attribute::Public,
                Attribute::Private,
                Attribute::Confidential
            ]));
        }

        #[test]
        fn deterministic() {
            let event = with_me(ResponseStatus::Accepted).with_recurring("s");
            assert_eq!(classify(&event, ME), classify(&event, ME));
        }
    }
}
