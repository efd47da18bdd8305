//! In-memory implementation of the `EventStore` trait.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use mailstore_core::error::DomainError;
use mailstore_core::event::{AggregateId, Event};
use mailstore_core::history::History;
use mailstore_core::store::{EventStore, batch_aggregate};

use crate::poisoned;

type Slot<P> = Arc<Mutex<History<P>>>;

/// Event store holding typed histories in memory.
///
/// Each aggregate owns its own lock, so appends to different aggregates never
/// contend beyond the brief lookup of their slot.
#[derive(Debug)]
pub struct InMemoryEventStore<P> {
    histories: RwLock<HashMap<AggregateId, Slot<P>>>,
}

impl<P> InMemoryEventStore<P> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            histories: RwLock::new(HashMap::new()),
        }
    }

    fn existing_slot(&self, aggregate_id: &AggregateId) -> Result<Option<Slot<P>>, DomainError> {
        let histories = self.histories.read().map_err(poisoned)?;
        Ok(histories.get(aggregate_id).cloned())
    }

    fn slot(&self, aggregate_id: &AggregateId) -> Result<Slot<P>, DomainError> {
        if let Some(slot) = self.existing_slot(aggregate_id)? {
            return Ok(slot);
        }
        let mut histories = self.histories.write().map_err(poisoned)?;
        Ok(Arc::clone(
            histories
                .entry(aggregate_id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(History::empty()))),
        ))
    }
}

impl<P> Default for InMemoryEventStore<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<P> EventStore for InMemoryEventStore<P>
where
    P: Clone + Send + Sync + 'static,
{
    type Payload = P;

    #[instrument(skip_all, fields(batch = events.len()))]
    async fn append(&self, events: Vec<Event<P>>) -> Result<(), DomainError> {
        let Some(aggregate_id) = batch_aggregate(&events)?.cloned() else {
            return Ok(());
        };
        let slot = self.slot(&aggregate_id)?;
        let mut history = slot.lock().map_err(poisoned)?;

        match history.append(events) {
            Ok(extended) => {
                *history = extended;
                debug!(%aggregate_id, version = ?history.version(), "events appended");
                Ok(())
            }
            Err(err) => {
                warn!(%aggregate_id, error = %err, "append rejected");
                Err(err)
            }
        }
    }

    #[instrument(skip(self), fields(aggregate_id = %aggregate_id))]
    async fn get_events_of_aggregate(
        &self,
        aggregate_id: &AggregateId,
    ) -> Result<History<P>, DomainError> {
        match self.existing_slot(aggregate_id)? {
            Some(slot) => Ok(slot.lock().map_err(poisoned)?.clone()),
            None => Ok(History::empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use mailstore_core::event::EventId;

    use super::*;

    fn agg(id: &str) -> AggregateId {
        AggregateId::new(id).unwrap()
    }

    #[tokio::test]
    async fn test_empty_append_is_noop() {
        let store: InMemoryEventStore<String> = InMemoryEventStore::new();

        store.append(Vec::new()).await.unwrap();

        assert!(store.histories.read().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_append_leaves_history_untouched() {
        // Arrange
        let store = InMemoryEventStore::new();
        let aggregate_id = agg("a");
        store
            .append(vec![Event::new(EventId::first(), aggregate_id.clone(), 1)])
            .await
            .unwrap();

        // Act
        let result = store
            .append(vec![
                Event::new(EventId::of(1), aggregate_id.clone(), 2),
                Event::new(EventId::of(1), aggregate_id.clone(), 3),
            ])
            .await;

        // Assert
        assert!(matches!(
            result,
            Err(DomainError::OptimisticConcurrencyConflict { .. })
        ));
        let history = store.get_events_of_aggregate(&aggregate_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.version(), Some(EventId::first()));
    }
}
