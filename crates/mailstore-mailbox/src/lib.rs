//! Mailstore Mailbox: mailbox domain events and their wire format.
//!
//! The `domain` module holds the validated value types and the closed set of
//! mailbox events. The `codec` module maps those events to and from the
//! durable JSON document form.

pub mod codec;
pub mod domain;
