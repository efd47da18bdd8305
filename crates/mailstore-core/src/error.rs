//! Domain and decode error types.

use thiserror::Error;

use crate::event::{AggregateId, EventId};

/// Top-level error type for the event store.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A precondition was violated at the API boundary.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A batch append spans more than one aggregate.
    #[error("append spans more than one aggregate: {expected} and {found}")]
    CrossAggregateAppend {
        /// Aggregate of the first event in the batch.
        expected: AggregateId,
        /// First aggregate found that differs from `expected`.
        found: AggregateId,
    },

    /// An appended event reuses an event id already present for its aggregate.
    #[error(
        "optimistic concurrency conflict on aggregate {aggregate_id}: event {event_id} does not follow version {}",
        display_version(.current_version)
    )]
    OptimisticConcurrencyConflict {
        /// The aggregate that had the conflict.
        aggregate_id: AggregateId,
        /// The rejected event id.
        event_id: EventId,
        /// The version the event had to follow.
        current_version: Option<EventId>,
    },

    /// Two events of one history share an event id.
    #[error("duplicate event id {event_id} in history of aggregate {aggregate_id}")]
    DuplicateEventId {
        /// The aggregate owning the history.
        aggregate_id: AggregateId,
        /// The repeated event id.
        event_id: EventId,
    },

    /// A stored document could not be turned back into an event.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

#[allow(clippy::ref_option)]
fn display_version(version: &Option<EventId>) -> String {
    version.map_or_else(|| "none".to_owned(), |v| v.to_string())
}

/// Why a document failed to decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeErrorKind {
    /// A mandatory field is absent or `null`.
    #[error("missing mandatory field")]
    MissingField,

    /// A field holds a JSON value of the wrong type.
    #[error("expected {expected}")]
    WrongType {
        /// Human-readable name of the expected JSON type.
        expected: &'static str,
    },

    /// A field has the right JSON type but violates its value grammar.
    #[error("malformed value: {0}")]
    MalformedValue(String),

    /// The discriminator names no known event variant.
    #[error("unknown event variant {0:?}")]
    UnknownVariant(String),

    /// An ACL rights string holds a character outside the rights alphabet.
    #[error("unsupported right {0:?}")]
    UnsupportedRight(char),
}

/// A structured decode failure carrying the offending field path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot decode `{path}`: {kind}")]
pub struct DecodeError {
    /// Dotted path of the offending field, `$` for the document root.
    pub path: String,
    /// What went wrong.
    pub kind: DecodeErrorKind,
}

impl DecodeError {
    /// Creates a new `DecodeError`.
    #[must_use]
    pub fn new(path: impl Into<String>, kind: DecodeErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// A mandatory field is missing at `path`.
    #[must_use]
    pub fn missing(path: impl Into<String>) -> Self {
        Self::new(path, DecodeErrorKind::MissingField)
    }

    /// The value at `path` is not of the `expected` JSON type.
    #[must_use]
    pub fn wrong_type(path: impl Into<String>, expected: &'static str) -> Self {
        Self::new(path, DecodeErrorKind::WrongType { expected })
    }

    /// The value at `path` violates its grammar.
    #[must_use]
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(path, DecodeErrorKind::MalformedValue(reason.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display_names_path_and_kind() {
        let err = DecodeError::missing("FlagsUpdated.sessionId");

        assert_eq!(
            err.to_string(),
            "cannot decode `FlagsUpdated.sessionId`: missing mandatory field"
        );
    }

    #[test]
    fn test_conflict_display_reports_none_for_empty_history() {
        let err = DomainError::OptimisticConcurrencyConflict {
            aggregate_id: AggregateId::new("agg-1").unwrap(),
            event_id: EventId::first(),
            current_version: None,
        };

        assert!(err.to_string().contains("version none"));
    }

    #[test]
    fn test_decode_error_converts_into_domain_error() {
        let err: DomainError = DecodeError::wrong_type("$", "object").into();

        match err {
            DomainError::Decode(inner) => assert_eq!(inner.path, "$"),
            other => panic!("expected Decode, got {other:?}"),
        }
    }
}
