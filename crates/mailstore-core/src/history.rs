//! Ordered event stream of a single aggregate.

use std::collections::HashSet;

use crate::error::DomainError;
use crate::event::{AggregateId, Event, EventId};
use crate::store::{batch_aggregate, ensure_appendable};

/// The materialized event stream of one aggregate, ordered by `EventId`.
///
/// A `History` is never mutated in place; appending produces a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History<P> {
    events: Vec<Event<P>>,
}

impl<P> History<P> {
    /// The history with no events.
    #[must_use]
    pub fn empty() -> Self {
        Self { events: Vec::new() }
    }

    /// Builds a history from events supplied in any order.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::DuplicateEventId` if two events share an id and
    /// `DomainError::InvalidArgument` if the events belong to more than one
    /// aggregate.
    pub fn of(events: impl IntoIterator<Item = Event<P>>) -> Result<Self, DomainError> {
        let mut events: Vec<Event<P>> = events.into_iter().collect();

        if let Some(first) = events.first() {
            if let Some(stranger) = events.iter().find(|e| !e.belongs_to(first.aggregate_id())) {
                return Err(DomainError::InvalidArgument(format!(
                    "history mixes aggregates {} and {}",
                    first.aggregate_id(),
                    stranger.aggregate_id()
                )));
            }
        }

        let mut seen = HashSet::with_capacity(events.len());
        for event in &events {
            if !seen.insert(event.event_id()) {
                return Err(DomainError::DuplicateEventId {
                    aggregate_id: event.aggregate_id().clone(),
                    event_id: event.event_id(),
                });
            }
        }

        events.sort_by_key(Event::event_id);
        Ok(Self { events })
    }

    /// The id of the last event, or `None` for an empty history.
    #[must_use]
    pub fn version(&self) -> Option<EventId> {
        self.events.last().map(Event::event_id)
    }

    /// The aggregate owning this history, or `None` when empty.
    #[must_use]
    pub fn aggregate_id(&self) -> Option<&AggregateId> {
        self.events.first().map(Event::aggregate_id)
    }

    /// Events in ascending `EventId` order.
    #[must_use]
    pub fn events(&self) -> &[Event<P>] {
        &self.events
    }

    /// Iterates events in ascending `EventId` order.
    pub fn iter(&self) -> std::slice::Iter<'_, Event<P>> {
        self.events.iter()
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the history holds no event.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Consumes the history, returning its ordered events.
    #[must_use]
    pub fn into_events(self) -> Vec<Event<P>> {
        self.events
    }
}

impl<P: Clone> History<P> {
    /// Returns a new history extended with `events`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CrossAggregateAppend` if `events` do not all
    /// belong to this history's aggregate, and
    /// `DomainError::OptimisticConcurrencyConflict` if an event id does not
    /// strictly follow the current version or the preceding event of the batch.
    pub fn append(&self, events: Vec<Event<P>>) -> Result<Self, DomainError> {
        let Some(aggregate_id) = batch_aggregate(&events)? else {
            return Ok(self.clone());
        };
        if let Some(own) = self.aggregate_id() {
            if own != aggregate_id {
                return Err(DomainError::CrossAggregateAppend {
                    expected: own.clone(),
                    found: aggregate_id.clone(),
                });
            }
        }
        ensure_appendable(aggregate_id, self.version(), events.iter().map(Event::event_id))?;

        let mut extended = self.events.clone();
        extended.extend(events);
        Ok(Self { events: extended })
    }
}

impl<P> Default for History<P> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a, P> IntoIterator for &'a History<P> {
    type Item = &'a Event<P>;
    type IntoIter = std::slice::Iter<'a, Event<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agg(id: &str) -> AggregateId {
        AggregateId::new(id).unwrap()
    }

    fn event(id: u64, aggregate: &str) -> Event<String> {
        Event::new(EventId::of(id), agg(aggregate), format!("event-{id}"))
    }

    #[test]
    fn test_empty_equals_of_nothing() {
        let of_nothing: History<String> = History::of(Vec::new()).unwrap();

        assert_eq!(History::<String>::empty(), of_nothing);
        assert_eq!(History::<String>::empty().version(), None);
    }

    #[test]
    fn test_of_sorts_by_event_id() {
        // Arrange
        let events = vec![event(2, "a"), event(0, "a"), event(1, "a")];

        // Act
        let history = History::of(events).unwrap();

        // Assert
        let ids: Vec<u64> = history.iter().map(|e| e.event_id().value()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(history.version(), Some(EventId::of(2)));
    }

    #[test]
    fn test_into_events_keeps_sorted_order() {
        let history = History::of(vec![event(5, "a"), event(1, "a")]).unwrap();

        let events = history.into_events();

        assert_eq!(events, vec![event(1, "a"), event(5, "a")]);
    }

    #[test]
    fn test_of_rejects_duplicate_event_id() {
        let result = History::of(vec![event(0, "a"), event(0, "a")]);

        match result {
            Err(DomainError::DuplicateEventId { event_id, .. }) => {
                assert_eq!(event_id, EventId::first());
            }
            other => panic!("expected DuplicateEventId, got {other:?}"),
        }
    }

    #[test]
    fn test_of_rejects_mixed_aggregates() {
        let result = History::of(vec![event(0, "a"), event(1, "b")]);

        assert!(matches!(result, Err(DomainError::InvalidArgument(_))));
    }

    #[test]
    fn test_version_is_maximum_even_with_gaps() {
        let history = History::of(vec![event(7, "a"), event(3, "a")]).unwrap();

        assert_eq!(history.version(), Some(EventId::of(7)));
    }

    #[test]
    fn test_append_returns_new_history() {
        // Arrange
        let history = History::of(vec![event(0, "a")]).unwrap();

        // Act
        let extended = history.append(vec![event(1, "a"), event(5, "a")]).unwrap();

        // Assert
        assert_eq!(history.len(), 1);
        assert_eq!(extended.len(), 3);
        assert_eq!(extended.version(), Some(EventId::of(5)));
    }

    #[test]
    fn test_append_rejects_rewriting_history() {
        let history = History::of(vec![event(0, "a"), event(1, "a")]).unwrap();

        let result = history.append(vec![event(1, "a")]);

        match result {
            Err(DomainError::OptimisticConcurrencyConflict {
                event_id,
                current_version,
                ..
            }) => {
                assert_eq!(event_id, EventId::of(1));
                assert_eq!(current_version, Some(EventId::of(1)));
            }
            other => panic!("expected OptimisticConcurrencyConflict, got {other:?}"),
        }
    }

    #[test]
    fn test_append_rejects_other_aggregate() {
        let history = History::of(vec![event(0, "a")]).unwrap();

        let result = history.append(vec![event(1, "b")]);

        assert!(matches!(
            result,
            Err(DomainError::CrossAggregateAppend { .. })
        ));
    }
}
