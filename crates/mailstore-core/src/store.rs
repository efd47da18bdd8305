//! Event store abstraction and the append rules every store enforces.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::event::{AggregateId, Event, EventId};
use crate::history::History;

/// Append-only repository of events keyed by aggregate.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// The payload carried by the events of this store.
    type Payload: Send + Sync;

    /// Appends `events` atomically: either all become visible or none do.
    ///
    /// An empty batch is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CrossAggregateAppend` if the events span more
    /// than one aggregate and `DomainError::OptimisticConcurrencyConflict` if
    /// an event id is already occupied for its aggregate.
    async fn append(&self, events: Vec<Event<Self::Payload>>) -> Result<(), DomainError>;

    /// Loads the history of `aggregate_id`, empty if it was never appended to.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the backing storage fails or holds events that
    /// cannot be reconstructed.
    async fn get_events_of_aggregate(
        &self,
        aggregate_id: &AggregateId,
    ) -> Result<History<Self::Payload>, DomainError>;
}

/// Returns the single aggregate targeted by `events`, or `None` for an empty
/// batch.
///
/// # Errors
///
/// Returns `DomainError::CrossAggregateAppend` if the batch spans several
/// aggregates.
pub fn batch_aggregate<P>(events: &[Event<P>]) -> Result<Option<&AggregateId>, DomainError> {
    let Some(first) = events.first() else {
        return Ok(None);
    };
    let expected = first.aggregate_id();
    match events.iter().find(|e| !e.belongs_to(expected)) {
        Some(stranger) => Err(DomainError::CrossAggregateAppend {
            expected: expected.clone(),
            found: stranger.aggregate_id().clone(),
        }),
        None => Ok(Some(expected)),
    }
}

/// Checks that `event_ids`, in order, each strictly follow `current_version`
/// and every id before them in the batch. Gaps are allowed.
///
/// # Errors
///
/// Returns `DomainError::OptimisticConcurrencyConflict` naming the first id
/// that is already occupied.
pub fn ensure_appendable(
    aggregate_id: &AggregateId,
    current_version: Option<EventId>,
    event_ids: impl IntoIterator<Item = EventId>,
) -> Result<(), DomainError> {
    let mut version = current_version;
    for event_id in event_ids {
        if version.is_some_and(|v| event_id <= v) {
            return Err(DomainError::OptimisticConcurrencyConflict {
                aggregate_id: aggregate_id.clone(),
                event_id,
                current_version: version,
            });
        }
        version = Some(event_id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agg(id: &str) -> AggregateId {
        AggregateId::new(id).unwrap()
    }

    #[test]
    fn test_batch_aggregate_of_empty_batch_is_none() {
        let events: Vec<Event<()>> = Vec::new();

        assert_eq!(batch_aggregate(&events).unwrap(), None);
    }

    #[test]
    fn test_batch_aggregate_rejects_mixed_batch() {
        let events = vec![
            Event::new(EventId::first(), agg("a"), ()),
            Event::new(EventId::first(), agg("b"), ()),
        ];

        match batch_aggregate(&events) {
            Err(DomainError::CrossAggregateAppend { expected, found }) => {
                assert_eq!(expected, agg("a"));
                assert_eq!(found, agg("b"));
            }
            other => panic!("expected CrossAggregateAppend, got {other:?}"),
        }
    }

    #[test]
    fn test_ensure_appendable_accepts_gaps() {
        let ids = [EventId::of(2), EventId::of(9)];

        assert!(ensure_appendable(&agg("a"), Some(EventId::of(1)), ids).is_ok());
    }

    #[test]
    fn test_ensure_appendable_rejects_duplicate_within_batch() {
        let ids = [EventId::first(), EventId::first()];

        let result = ensure_appendable(&agg("a"), None, ids);

        match result {
            Err(DomainError::OptimisticConcurrencyConflict {
                event_id,
                current_version,
                ..
            }) => {
                assert_eq!(event_id, EventId::first());
                assert_eq!(current_version, Some(EventId::first()));
            }
            other => panic!("expected OptimisticConcurrencyConflict, got {other:?}"),
        }
    }

    #[test]
    fn test_ensure_appendable_rejects_descending_batch() {
        let ids = [EventId::of(3), EventId::of(2)];

        assert!(ensure_appendable(&agg("a"), None, ids).is_err());
    }
}
