//! Test backends: mock `EventBackend` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use mailstore_core::backend::{EventBackend, StoredEvent};
use mailstore_core::error::DomainError;
use mailstore_core::event::{AggregateId, EventId};

/// One recorded `append_if_version` call.
pub type AppendCall = (AggregateId, Option<EventId>, Vec<StoredEvent>);

/// A backend that records all `append_if_version` calls. Returns the
/// configured documents from every `load` call and always accepts appends.
#[derive(Debug)]
pub struct RecordingEventBackend {
    load_result: Vec<StoredEvent>,
    appended: Mutex<Vec<AppendCall>>,
}

impl RecordingEventBackend {
    /// Creates a backend that will return `load_result` from every `load`.
    #[must_use]
    pub fn new(load_result: Vec<StoredEvent>) -> Self {
        Self {
            load_result,
            appended: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of all appends.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn appended(&self) -> Vec<AppendCall> {
        self.appended.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventBackend for RecordingEventBackend {
    async fn load(&self, _aggregate_id: &AggregateId) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(self.load_result.clone())
    }

    async fn append_if_version(
        &self,
        aggregate_id: &AggregateId,
        expected_version: Option<EventId>,
        events: Vec<StoredEvent>,
    ) -> Result<(), DomainError> {
        self.appended
            .lock()
            .unwrap()
            .push((aggregate_id.clone(), expected_version, events));
        Ok(())
    }
}

/// A backend with no documents that silently drops appends.
#[derive(Debug)]
pub struct EmptyEventBackend;

#[async_trait]
impl EventBackend for EmptyEventBackend {
    async fn load(&self, _aggregate_id: &AggregateId) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(vec![])
    }

    async fn append_if_version(
        &self,
        _aggregate_id: &AggregateId,
        _expected_version: Option<EventId>,
        _events: Vec<StoredEvent>,
    ) -> Result<(), DomainError> {
        Ok(())
    }
}

/// A backend that always returns an infrastructure error.
#[derive(Debug)]
pub struct FailingEventBackend;

#[async_trait]
impl EventBackend for FailingEventBackend {
    async fn load(&self, _aggregate_id: &AggregateId) -> Result<Vec<StoredEvent>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn append_if_version(
        &self,
        _aggregate_id: &AggregateId,
        _expected_version: Option<EventId>,
        _events: Vec<StoredEvent>,
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
