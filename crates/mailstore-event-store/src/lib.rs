//! Mailstore event stores.
//!
//! `InMemoryEventStore` keeps typed histories. `SerializingEventStore` runs
//! every event through an `EventCodec` and persists documents in an
//! `EventBackend`, of which `InMemoryEventBackend` is the reference
//! implementation.

pub mod in_memory_backend;
pub mod in_memory_event_store;
pub mod serializing_event_store;

pub use in_memory_backend::InMemoryEventBackend;
pub use in_memory_event_store::InMemoryEventStore;
pub use serializing_event_store::SerializingEventStore;

use std::sync::PoisonError;

use mailstore_core::error::DomainError;

pub(crate) fn poisoned<T>(_: PoisonError<T>) -> DomainError {
    DomainError::Infrastructure("event store lock poisoned".into())
}
