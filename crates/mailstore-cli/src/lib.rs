//! Mailstore import command.
//!
//! Loads a newline-delimited mailbox event log into an in-memory store and
//! reports the version reached by every aggregate.

pub mod config;
pub mod error;
pub mod import;
