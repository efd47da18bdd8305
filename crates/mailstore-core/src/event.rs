//! Event identity and the immutable event envelope.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Position of an event within its aggregate stream.
///
/// Doubles as the optimistic-concurrency version token: appending an event
/// whose id does not follow the current version of its aggregate is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(u64);

impl EventId {
    /// The id of the first event of any aggregate.
    #[must_use]
    pub const fn first() -> Self {
        Self(0)
    }

    /// Builds an event id from its raw position.
    #[must_use]
    pub const fn of(value: u64) -> Self {
        Self(value)
    }

    /// The id immediately following this one, or `None` past the last
    /// representable position.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Returns the raw position.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier of one aggregate instance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateId(String);

impl AggregateId {
    /// Creates a new `AggregateId`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` if `value` is empty or blank.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::InvalidArgument(
                "aggregate id must not be blank".into(),
            ));
        }
        Ok(Self(value))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AggregateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An immutable fact recorded against one aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event<P> {
    event_id: EventId,
    aggregate_id: AggregateId,
    payload: P,
}

impl<P> Event<P> {
    /// Creates a new event.
    #[must_use]
    pub fn new(event_id: EventId, aggregate_id: AggregateId, payload: P) -> Self {
        Self {
            event_id,
            aggregate_id,
            payload,
        }
    }

    /// Returns the position of this event in its aggregate stream.
    #[must_use]
    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    /// Returns the aggregate this event belongs to.
    #[must_use]
    pub fn aggregate_id(&self) -> &AggregateId {
        &self.aggregate_id
    }

    /// Returns the variant-specific payload.
    #[must_use]
    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// Whether this event belongs to `aggregate_id`.
    #[must_use]
    pub fn belongs_to(&self, aggregate_id: &AggregateId) -> bool {
        &self.aggregate_id == aggregate_id
    }

    /// Splits the event into its parts.
    #[must_use]
    pub fn into_parts(self) -> (EventId, AggregateId, P) {
        (self.event_id, self.aggregate_id, self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_is_minimum_and_next_increases() {
        let first = EventId::first();

        let second = first.next().unwrap();

        assert_eq!(first.value(), 0);
        assert!(first < second);
        assert!(second < second.next().unwrap());
    }

    #[test]
    fn test_next_stops_at_last_position() {
        let last = EventId::of(u64::MAX);

        assert_eq!(last.next(), None);
        assert_eq!(EventId::of(u64::MAX - 1).next(), Some(last));
    }

    #[test]
    fn test_aggregate_id_rejects_blank() {
        let result = AggregateId::new("   ");

        match result {
            Err(DomainError::InvalidArgument(_)) => {}
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    #[test]
    fn test_event_accessors() {
        let aggregate_id = AggregateId::new("agg-1").unwrap();
        let event = Event::new(EventId::of(3), aggregate_id.clone(), "payload");

        assert_eq!(event.event_id(), EventId::of(3));
        assert_eq!(event.aggregate_id(), &aggregate_id);
        assert_eq!(*event.payload(), "payload");
        assert!(event.belongs_to(&aggregate_id));
        assert!(!event.belongs_to(&AggregateId::new("agg-2").unwrap()));
    }

    #[test]
    fn test_into_parts_returns_every_field() {
        let aggregate_id = AggregateId::new("agg-1").unwrap();
        let event = Event::new(EventId::of(7), aggregate_id.clone(), "payload");

        let (event_id, owner, payload) = event.into_parts();

        assert_eq!(event_id, EventId::of(7));
        assert_eq!(owner, aggregate_id);
        assert_eq!(payload, "payload");
    }
}
