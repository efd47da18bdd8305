//! Mailbox and message identifiers and the factories that parse them.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use mailstore_core::error::DomainError;
use uuid::Uuid;

/// Identifier of a mailbox, in the textual form chosen by the backend.
///
/// Only an [`IdFactory`] builds one, so every value is canonical.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MailboxId(String);

/// Identifier of a message, in the textual form chosen by the backend.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(String);

macro_rules! opaque_id {
    ($name:ident) => {
        impl $name {
            /// Returns the serialized form.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_id!(MailboxId);
opaque_id!(MessageId);

/// Parses and mints identifiers of type `T` for a given backend.
pub trait IdFactory<T>: Send + Sync {
    /// Parses the serialized form of an identifier.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` if `raw` is not an identifier
    /// this backend could have produced.
    fn from_string(&self, raw: &str) -> Result<T, DomainError>;

    /// Mints a fresh identifier.
    fn generate(&self) -> T;
}

/// Factory for backends keyed by UUIDs (canonical lower-case hyphenated form).
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdFactory;

impl UuidIdFactory {
    fn parse(raw: &str) -> Result<String, DomainError> {
        Uuid::parse_str(raw)
            .map(|uuid| uuid.hyphenated().to_string())
            .map_err(|e| DomainError::InvalidArgument(format!("invalid uuid id {raw:?}: {e}")))
    }
}

impl IdFactory<MailboxId> for UuidIdFactory {
    fn from_string(&self, raw: &str) -> Result<MailboxId, DomainError> {
        Self::parse(raw).map(MailboxId)
    }

    fn generate(&self) -> MailboxId {
        MailboxId(Uuid::new_v4().hyphenated().to_string())
    }
}

impl IdFactory<MessageId> for UuidIdFactory {
    fn from_string(&self, raw: &str) -> Result<MessageId, DomainError> {
        Self::parse(raw).map(MessageId)
    }

    fn generate(&self) -> MessageId {
        MessageId(Uuid::new_v4().hyphenated().to_string())
    }
}

/// Factory for backends keyed by decimal 64-bit counters.
#[derive(Debug, Default)]
pub struct NumericIdFactory {
    next: AtomicU64,
}

impl NumericIdFactory {
    /// Creates a factory whose first generated id is `start`.
    #[must_use]
    pub fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }

    fn parse(raw: &str) -> Result<String, DomainError> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::InvalidArgument(format!(
                "invalid numeric id {raw:?}"
            )));
        }
        raw.parse::<u64>()
            .map(|n| n.to_string())
            .map_err(|e| DomainError::InvalidArgument(format!("invalid numeric id {raw:?}: {e}")))
    }

    fn mint(&self) -> String {
        self.next.fetch_add(1, Ordering::Relaxed).to_string()
    }
}

impl IdFactory<MailboxId> for NumericIdFactory {
    fn from_string(&self, raw: &str) -> Result<MailboxId, DomainError> {
        Self::parse(raw).map(MailboxId)
    }

    fn generate(&self) -> MailboxId {
        MailboxId(self.mint())
    }
}

impl IdFactory<MessageId> for NumericIdFactory {
    fn from_string(&self, raw: &str) -> Result<MessageId, DomainError> {
        Self::parse(raw).map(MessageId)
    }

    fn generate(&self) -> MessageId {
        MessageId(self.mint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_factory_canonicalizes() {
        let id: MailboxId = UuidIdFactory
            .from_string("6E0DD59D-660E-4D9B-B22F-0354479F47B4")
            .unwrap();

        assert_eq!(id.as_str(), "6e0dd59d-660e-4d9b-b22f-0354479f47b4");
    }

    #[test]
    fn test_uuid_factory_rejects_garbage() {
        let result: Result<MessageId, _> = UuidIdFactory.from_string("not-a-uuid");

        assert!(matches!(result, Err(DomainError::InvalidArgument(_))));
    }

    #[test]
    fn test_generated_ids_parse_back() {
        let factory = NumericIdFactory::starting_at(41);

        let id: MessageId = factory.generate();
        let next: MessageId = factory.generate();

        assert_eq!(id.as_str(), "41");
        assert_eq!(next.as_str(), "42");
        let parsed: MessageId = factory.from_string(id.as_str()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_numeric_factory_strips_leading_zeros() {
        let id: MailboxId = NumericIdFactory::default().from_string("007").unwrap();

        assert_eq!(id.as_str(), "7");
    }

    #[test]
    fn test_numeric_factory_rejects_signs_and_blanks() {
        for raw in ["", "-1", "+1", "1.5", "abc"] {
            let result: Result<MailboxId, _> = NumericIdFactory::default().from_string(raw);
            assert!(result.is_err(), "{raw:?} should be rejected");
        }
    }
}
