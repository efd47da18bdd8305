//! Shared test backends and event fixtures for the mailstore event log.

mod backend;
pub mod fixtures;

pub use backend::{AppendCall, EmptyEventBackend, FailingEventBackend, RecordingEventBackend};
