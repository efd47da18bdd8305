//! Physical backend contract.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DomainError;
use crate::event::{AggregateId, EventId};

/// Serialized representation of an event as handed to a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEvent {
    /// Aggregate this event belongs to.
    pub aggregate_id: AggregateId,
    /// Position within the aggregate stream.
    pub event_id: EventId,
    /// Document produced by the event codec.
    pub document: serde_json::Value,
}

/// Key-value persistence surface keyed by aggregate.
#[async_trait]
pub trait EventBackend: Send + Sync {
    /// Load all stored events of an aggregate, ordered by event id.
    async fn load(&self, aggregate_id: &AggregateId) -> Result<Vec<StoredEvent>, DomainError>;

    /// Atomically append `events` if the aggregate's current version is still
    /// `expected_version` (`None` meaning no event stored yet).
    ///
    /// # Errors
    ///
    /// Returns `DomainError::OptimisticConcurrencyConflict` when another
    /// writer moved the version first.
    async fn append_if_version(
        &self,
        aggregate_id: &AggregateId,
        expected_version: Option<EventId>,
        events: Vec<StoredEvent>,
    ) -> Result<(), DomainError>;
}

#[async_trait]
impl<B> EventBackend for Arc<B>
where
    B: EventBackend + ?Sized,
{
    async fn load(&self, aggregate_id: &AggregateId) -> Result<Vec<StoredEvent>, DomainError> {
        (**self).load(aggregate_id).await
    }

    async fn append_if_version(
        &self,
        aggregate_id: &AggregateId,
        expected_version: Option<EventId>,
        events: Vec<StoredEvent>,
    ) -> Result<(), DomainError> {
        (**self)
            .append_if_version(aggregate_id, expected_version, events)
            .await
    }
}
