//! Event store that persists codec documents through an `EventBackend`.

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use mailstore_core::backend::{EventBackend, StoredEvent};
use mailstore_core::codec::EventCodec;
use mailstore_core::error::DomainError;
use mailstore_core::event::{AggregateId, Event};
use mailstore_core::history::History;
use mailstore_core::store::{EventStore, batch_aggregate, ensure_appendable};

/// Event store encoding events with `C` and storing the documents in `B`.
///
/// The backend's conditional write guards against concurrent writers: the
/// store reads the current version, validates the batch against it and asks
/// the backend to append only if that version is still current.
#[derive(Debug)]
pub struct SerializingEventStore<B, C> {
    backend: B,
    codec: C,
}

impl<B, C> SerializingEventStore<B, C> {
    /// Creates a store over `backend` using `codec`.
    #[must_use]
    pub fn new(backend: B, codec: C) -> Self {
        Self { backend, codec }
    }

    /// Returns the backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the codec.
    #[must_use]
    pub fn codec(&self) -> &C {
        &self.codec
    }
}

impl<B, C> SerializingEventStore<B, C>
where
    C: EventCodec,
{
    fn reconstruct(&self, stored: &StoredEvent) -> Result<Event<C::Payload>, DomainError> {
        let event = self.codec.decode(&stored.document)?;
        if event.event_id() != stored.event_id || event.aggregate_id() != &stored.aggregate_id {
            return Err(DomainError::Infrastructure(format!(
                "document stored as event {} of {} decodes as event {} of {}",
                stored.event_id,
                stored.aggregate_id,
                event.event_id(),
                event.aggregate_id()
            )));
        }
        Ok(event)
    }
}

#[async_trait]
impl<B, C> EventStore for SerializingEventStore<B, C>
where
    B: EventBackend,
    C: EventCodec,
    C::Payload: Send + Sync,
{
    type Payload = C::Payload;

    #[instrument(skip_all, fields(batch = events.len()))]
    async fn append(&self, events: Vec<Event<C::Payload>>) -> Result<(), DomainError> {
        let Some(aggregate_id) = batch_aggregate(&events)?.cloned() else {
            return Ok(());
        };

        let current_version = self
            .backend
            .load(&aggregate_id)
            .await?
            .last()
            .map(|e| e.event_id);
        if let Err(err) =
            ensure_appendable(&aggregate_id, current_version, events.iter().map(Event::event_id))
        {
            warn!(%aggregate_id, error = %err, "append rejected");
            return Err(err);
        }

        let documents: Vec<StoredEvent> = events
            .iter()
            .map(|event| StoredEvent {
                aggregate_id: aggregate_id.clone(),
                event_id: event.event_id(),
                document: self.codec.encode(event),
            })
            .collect();

        self.backend
            .append_if_version(&aggregate_id, current_version, documents)
            .await
            .inspect_err(|err| warn!(%aggregate_id, error = %err, "conditional write rejected"))?;
        debug!(%aggregate_id, "events persisted");
        Ok(())
    }

    #[instrument(skip(self), fields(aggregate_id = %aggregate_id))]
    async fn get_events_of_aggregate(
        &self,
        aggregate_id: &AggregateId,
    ) -> Result<History<C::Payload>, DomainError> {
        let stored = self.backend.load(aggregate_id).await?;
        let events = stored
            .iter()
            .map(|s| self.reconstruct(s))
            .collect::<Result<Vec<_>, _>>()?;
        History::of(events)
    }
}
