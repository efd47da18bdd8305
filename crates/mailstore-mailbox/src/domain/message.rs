//! Message-level value types.

use std::fmt;

use chrono::{DateTime, Datelike, SubsecRound, Utc};
use mailstore_core::error::DomainError;

use super::flags::Flags;
use super::ids::MessageId;

/// Identifier of the mailbox session that caused an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(i64);

impl SessionId {
    /// Wraps a raw session id.
    #[must_use]
    pub const fn of(value: i64) -> Self {
        Self(value)
    }

    /// The raw value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

/// IMAP UID of a message within its mailbox. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageUid(u64);

impl MessageUid {
    /// The smallest valid UID.
    pub const MIN: Self = Self(1);

    /// Wraps a raw UID.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` for zero.
    pub fn of(value: u64) -> Result<Self, DomainError> {
        if value == 0 {
            return Err(DomainError::InvalidArgument("message uid must be positive".into()));
        }
        Ok(Self(value))
    }

    /// The raw value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Modification sequence (RFC 7162).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModSeq(u64);

impl ModSeq {
    /// Wraps a raw modification sequence.
    #[must_use]
    pub const fn of(value: u64) -> Self {
        Self(value)
    }

    /// The raw value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// A UTC instant with millisecond precision, within years 0 to 9999.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Truncates `instant` to millisecond precision.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` if the year falls outside
    /// 0..=9999.
    pub fn new(instant: DateTime<Utc>) -> Result<Self, DomainError> {
        if !(0..=9999).contains(&instant.year()) {
            return Err(DomainError::InvalidArgument(format!(
                "timestamp {instant} is outside years 0..=9999"
            )));
        }
        Ok(Self(instant.trunc_subsecs(3)))
    }

    /// Builds a timestamp from milliseconds since the Unix epoch.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` if the instant is not
    /// representable.
    pub fn from_millis(millis: i64) -> Result<Self, DomainError> {
        let instant = DateTime::from_timestamp_millis(millis).ok_or_else(|| {
            DomainError::InvalidArgument(format!("{millis} ms is not a valid instant"))
        })?;
        Self::new(instant)
    }

    /// The instant.
    #[must_use]
    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }

    /// Milliseconds since the Unix epoch.
    #[must_use]
    pub fn millis(&self) -> i64 {
        self.0.timestamp_millis()
    }
}

/// Identifier of a blob holding message content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobId(String);

impl BlobId {
    /// Wraps a blob id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` if `value` is empty.
    pub fn of(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.is_empty() {
            return Err(DomainError::InvalidArgument("blob id must not be empty".into()));
        }
        Ok(Self(value))
    }

    /// The serialized form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// What is known about a message when it is added or expunged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageMetaData {
    /// UID within the mailbox.
    pub uid: MessageUid,
    /// Modification sequence at the time of the event.
    pub mod_seq: ModSeq,
    /// Flags at the time of the event.
    pub flags: Flags,
    /// Size in bytes.
    pub size: u64,
    /// IMAP internal date.
    pub internal_date: Timestamp,
    /// Backend identifier of the message.
    pub message_id: MessageId,
    /// Thread the message belongs to, when threading is known.
    pub thread_id: Option<MessageId>,
}

/// Flags of one message before and after an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatedFlags {
    /// UID within the mailbox.
    pub uid: MessageUid,
    /// Backend identifier of the message, when known.
    pub message_id: Option<MessageId>,
    /// Modification sequence after the update.
    pub mod_seq: ModSeq,
    /// Flags before the update.
    pub old_flags: Flags,
    /// Flags after the update.
    pub new_flags: Flags,
}

impl UpdatedFlags {
    /// Whether the update changed anything.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.old_flags != self.new_flags
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::domain::flags::SystemFlag;

    #[test]
    fn test_timestamp_truncates_to_millis() {
        let instant = Utc.with_ymd_and_hms(2018, 12, 14, 9, 41, 51).unwrap()
            + chrono::Duration::nanoseconds(541_999_999);

        let timestamp = Timestamp::new(instant).unwrap();

        assert_eq!(timestamp.millis() % 1000, 541);
    }

    #[test]
    fn test_timestamp_rejects_five_digit_years() {
        let instant = Utc.with_ymd_and_hms(10_000, 1, 1, 0, 0, 0).unwrap();

        assert!(Timestamp::new(instant).is_err());
    }

    #[test]
    fn test_updated_flags_is_modified_when_flags_differ() {
        let mut update = UpdatedFlags {
            uid: MessageUid::MIN,
            message_id: None,
            mod_seq: ModSeq::of(1),
            old_flags: Flags::empty(),
            new_flags: Flags::empty(),
        };
        assert!(!update.is_modified());

        update.new_flags = Flags::of_system([SystemFlag::Flagged]);

        assert!(update.is_modified());
    }

    #[test]
    fn test_message_uid_is_positive() {
        assert!(MessageUid::of(0).is_err());
        assert_eq!(MessageUid::of(1).unwrap(), MessageUid::MIN);
    }
}
