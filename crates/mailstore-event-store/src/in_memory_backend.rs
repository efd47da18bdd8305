//! In-memory implementation of the `EventBackend` trait.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use tracing::{debug, instrument};

use mailstore_core::backend::{EventBackend, StoredEvent};
use mailstore_core::error::DomainError;
use mailstore_core::event::{AggregateId, EventId};
use mailstore_core::store::ensure_appendable;

use crate::poisoned;

type Slot = Arc<Mutex<Vec<StoredEvent>>>;

/// Backend keeping serialized documents in memory, one locked stream per
/// aggregate.
#[derive(Debug, Default)]
pub struct InMemoryEventBackend {
    streams: RwLock<HashMap<AggregateId, Slot>>,
}

impl InMemoryEventBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregates that have at least one stored event, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the index lock is poisoned.
    pub fn aggregate_ids(&self) -> Result<Vec<AggregateId>, DomainError> {
        let streams = self.streams.read().map_err(poisoned)?;
        let mut ids = Vec::with_capacity(streams.len());
        for (id, slot) in streams.iter() {
            if !slot.lock().map_err(poisoned)?.is_empty() {
                ids.push(id.clone());
            }
        }
        Ok(ids)
    }

    fn slot(&self, aggregate_id: &AggregateId) -> Result<Slot, DomainError> {
        if let Some(slot) = self.streams.read().map_err(poisoned)?.get(aggregate_id) {
            return Ok(Arc::clone(slot));
        }
        let mut streams = self.streams.write().map_err(poisoned)?;
        Ok(Arc::clone(streams.entry(aggregate_id.clone()).or_default()))
    }
}

#[async_trait]
impl EventBackend for InMemoryEventBackend {
    async fn load(&self, aggregate_id: &AggregateId) -> Result<Vec<StoredEvent>, DomainError> {
        let slot = self.streams.read().map_err(poisoned)?.get(aggregate_id).cloned();
        match slot {
            Some(slot) => Ok(slot.lock().map_err(poisoned)?.clone()),
            None => Ok(Vec::new()),
        }
    }

    #[instrument(skip(self, events), fields(aggregate_id = %aggregate_id, batch = events.len()))]
    async fn append_if_version(
        &self,
        aggregate_id: &AggregateId,
        expected_version: Option<EventId>,
        events: Vec<StoredEvent>,
    ) -> Result<(), DomainError> {
        if let Some(stranger) = events.iter().find(|e| &e.aggregate_id != aggregate_id) {
            return Err(DomainError::CrossAggregateAppend {
                expected: aggregate_id.clone(),
                found: stranger.aggregate_id.clone(),
            });
        }
        let Some(first) = events.first().map(|e| e.event_id) else {
            return Ok(());
        };

        let slot = self.slot(aggregate_id)?;
        let mut stream = slot.lock().map_err(poisoned)?;
        let current_version = stream.last().map(|e| e.event_id);
        if current_version != expected_version {
            return Err(DomainError::OptimisticConcurrencyConflict {
                aggregate_id: aggregate_id.clone(),
                event_id: first,
                current_version,
            });
        }
        ensure_appendable(aggregate_id, current_version, events.iter().map(|e| e.event_id))?;

        stream.extend(events);
        debug!(version = ?stream.last().map(|e| e.event_id), "documents stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn stored(aggregate: &str, id: u64) -> StoredEvent {
        StoredEvent {
            aggregate_id: AggregateId::new(aggregate).unwrap(),
            event_id: EventId::of(id),
            document: json!({"Test": {"eventId": id}}),
        }
    }

    #[tokio::test]
    async fn test_load_returns_empty_for_unknown_aggregate() {
        let backend = InMemoryEventBackend::new();

        let loaded = backend
            .load(&AggregateId::new("nobody").unwrap())
            .await
            .unwrap();

        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn test_append_if_version_rejects_stale_expectation() {
        // Arrange
        let backend = InMemoryEventBackend::new();
        let aggregate_id = AggregateId::new("a").unwrap();
        backend
            .append_if_version(&aggregate_id, None, vec![stored("a", 0)])
            .await
            .unwrap();

        // Act
        let result = backend
            .append_if_version(&aggregate_id, None, vec![stored("a", 1)])
            .await;

        // Assert
        match result {
            Err(DomainError::OptimisticConcurrencyConflict {
                current_version, ..
            }) => assert_eq!(current_version, Some(EventId::first())),
            other => panic!("expected OptimisticConcurrencyConflict, got {other:?}"),
        }
        assert_eq!(backend.load(&aggregate_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_aggregate_ids_lists_only_written_streams() {
        let backend = InMemoryEventBackend::new();
        backend
            .append_if_version(&AggregateId::new("a").unwrap(), None, vec![stored("a", 0)])
            .await
            .unwrap();

        let ids = backend.aggregate_ids().unwrap();

        assert_eq!(ids, vec![AggregateId::new("a").unwrap()]);
    }
}
