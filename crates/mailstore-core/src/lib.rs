//! Mailstore Core: event-sourcing primitives.
//!
//! This crate defines the identity types, the per-aggregate `History`, the
//! `EventStore` trait and the contracts that codecs and physical backends
//! must honor. It contains no infrastructure code.

pub mod backend;
pub mod codec;
pub mod error;
pub mod event;
pub mod history;
pub mod store;
