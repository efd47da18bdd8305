//! Mailbox domain model.

pub mod acl;
pub mod events;
pub mod flags;
pub mod ids;
pub mod message;
pub mod path;
pub mod quota;
pub mod user;
