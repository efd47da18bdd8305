//! Sample mailbox events, one builder per variant.
//!
//! Identifiers are decimal strings so the events decode with a
//! `NumericIdFactory` codec.

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use mailstore_core::event::{AggregateId, Event, EventId};
use mailstore_mailbox::domain::acl::{AclDiff, EntryKey, MailboxAcl, Rights};
use mailstore_mailbox::domain::events::{
    AclUpdated, FlagsUpdated, MailboxAdded, MailboxDeletion, MailboxEvent, MailboxRenamed,
    MailboxSubscription, MessageContentDeleted, MessageMoved, MessagesAdded, MessagesExpunged,
    QuotaUsageUpdated,
};
use mailstore_mailbox::domain::flags::{Flags, SystemFlag};
use mailstore_mailbox::domain::ids::{IdFactory, MailboxId, MessageId, NumericIdFactory};
use mailstore_mailbox::domain::message::{
    BlobId, MessageMetaData, MessageUid, ModSeq, SessionId, Timestamp, UpdatedFlags,
};
use mailstore_mailbox::domain::path::MailboxPath;
use mailstore_mailbox::domain::quota::{Quota, QuotaLimit, QuotaRoot, QuotaScope};
use mailstore_mailbox::domain::user::Username;

/// `bob@domain.tld`.
///
/// # Panics
///
/// Never; the literal is a valid username.
#[must_use]
pub fn user() -> Username {
    Username::of("bob@domain.tld").unwrap()
}

/// `#private:bob@domain.tld:mailboxName`.
#[must_use]
pub fn mailbox_path() -> MailboxPath {
    MailboxPath::for_user(user(), "mailboxName")
}

/// Mailbox id parsed from `raw` by a `NumericIdFactory`.
///
/// # Panics
///
/// Panics if `raw` is not a decimal `u64`.
#[must_use]
pub fn mailbox_id_of(raw: &str) -> MailboxId {
    NumericIdFactory::default().from_string(raw).unwrap()
}

/// Message id parsed from `raw` by a `NumericIdFactory`.
///
/// # Panics
///
/// Panics if `raw` is not a decimal `u64`.
#[must_use]
pub fn message_id_of(raw: &str) -> MessageId {
    NumericIdFactory::default().from_string(raw).unwrap()
}

/// Mailbox id `18`.
#[must_use]
pub fn mailbox_id() -> MailboxId {
    mailbox_id_of("18")
}

/// Session `42`.
#[must_use]
pub fn session_id() -> SessionId {
    SessionId::of(42)
}

/// 2018-12-14T09:41:51.541Z.
///
/// # Panics
///
/// Never; the literal is a valid instant.
#[must_use]
pub fn timestamp() -> Timestamp {
    let instant = Utc.with_ymd_and_hms(2018, 12, 14, 9, 41, 51).unwrap()
        + chrono::Duration::milliseconds(541);
    Timestamp::new(instant).unwrap()
}

/// Quota of 23 used out of 100, with a user-scoped limit of 100.
#[must_use]
pub fn quota() -> Quota {
    Quota::new(23, QuotaLimit::Limited(100))
        .with_scoped_limit(QuotaScope::User, QuotaLimit::Limited(100))
}

/// Metadata of message `uid`, identified by `message_id`.
///
/// # Panics
///
/// Panics if `uid` is zero.
#[must_use]
pub fn message_metadata(uid: u64, message_id: &str) -> MessageMetaData {
    MessageMetaData {
        uid: MessageUid::of(uid).unwrap(),
        mod_seq: ModSeq::of(35),
        flags: Flags::new([SystemFlag::Answered, SystemFlag::Seen], ["custom"]).unwrap(),
        size: 45,
        internal_date: timestamp(),
        message_id: message_id_of(message_id),
        thread_id: None,
    }
}

/// A `MailboxAdded` payload.
#[must_use]
pub fn mailbox_added() -> MailboxEvent {
    MailboxEvent::MailboxAdded(MailboxAdded {
        path: mailbox_path(),
        mailbox_id: mailbox_id(),
        user: user(),
        session_id: session_id(),
    })
}

/// A `MailboxDeletion` payload.
#[must_use]
pub fn mailbox_deletion() -> MailboxEvent {
    MailboxEvent::MailboxDeletion(MailboxDeletion {
        path: mailbox_path(),
        mailbox_id: mailbox_id(),
        user: user(),
        session_id: session_id(),
        acl: MailboxAcl::owner_full_rights(),
        quota_root: QuotaRoot::new("#private&bob@domain.tld"),
        deleted_message_count: Quota::new(60, QuotaLimit::Unlimited),
        total_deleted_size: quota(),
    })
}

/// A `MailboxRenamed` payload.
#[must_use]
pub fn mailbox_renamed() -> MailboxEvent {
    MailboxEvent::MailboxRenamed(MailboxRenamed {
        path: mailbox_path(),
        new_path: MailboxPath::for_user(user(), "newMailboxName"),
        mailbox_id: mailbox_id(),
        user: user(),
        session_id: session_id(),
    })
}

/// An `AclUpdated` payload granting `alice` lookup and read.
///
/// # Panics
///
/// Never; the literals are valid ACL entries.
#[must_use]
pub fn acl_updated() -> MailboxEvent {
    let old_acl = MailboxAcl::owner_full_rights();
    let new_acl = old_acl.with_entry(
        EntryKey::user("alice").unwrap(),
        Rights::parse("lr").unwrap(),
    );
    MailboxEvent::AclUpdated(AclUpdated {
        path: mailbox_path(),
        mailbox_id: mailbox_id(),
        user: user(),
        session_id: session_id(),
        acl_diff: AclDiff::new(old_acl, new_acl),
    })
}

fn subscription() -> MailboxSubscription {
    MailboxSubscription {
        path: mailbox_path(),
        mailbox_id: mailbox_id(),
        user: user(),
        session_id: session_id(),
    }
}

/// A `MailboxSubscribed` payload.
#[must_use]
pub fn mailbox_subscribed() -> MailboxEvent {
    MailboxEvent::MailboxSubscribed(subscription())
}

/// A `MailboxUnsubscribed` payload.
#[must_use]
pub fn mailbox_unsubscribed() -> MailboxEvent {
    MailboxEvent::MailboxUnsubscribed(subscription())
}

/// A `MessagesAdded` payload holding one delivered message.
#[must_use]
pub fn messages_added() -> MailboxEvent {
    let metadata = message_metadata(123, "42");
    MailboxEvent::MessagesAdded(MessagesAdded {
        path: mailbox_path(),
        mailbox_id: mailbox_id(),
        user: user(),
        session_id: session_id(),
        added: BTreeMap::from([(metadata.uid, metadata)]),
        is_delivery: true,
        is_appended: false,
    })
}

/// A `MessagesExpunged` payload holding one message.
#[must_use]
pub fn messages_expunged() -> MailboxEvent {
    let metadata = message_metadata(123, "42");
    MailboxEvent::MessagesExpunged(MessagesExpunged {
        path: mailbox_path(),
        mailbox_id: mailbox_id(),
        user: user(),
        session_id: session_id(),
        expunged: BTreeMap::from([(metadata.uid, metadata)]),
    })
}

/// A `FlagsUpdated` payload marking one message as seen.
///
/// # Panics
///
/// Never; the uid is non-zero.
#[must_use]
pub fn flags_updated() -> MailboxEvent {
    MailboxEvent::FlagsUpdated(FlagsUpdated {
        path: mailbox_path(),
        mailbox_id: mailbox_id(),
        user: user(),
        session_id: session_id(),
        updated_flags: vec![UpdatedFlags {
            uid: MessageUid::of(123).unwrap(),
            message_id: Some(message_id_of("42")),
            mod_seq: ModSeq::of(36),
            old_flags: Flags::empty(),
            new_flags: Flags::of_system([SystemFlag::Seen]),
        }],
    })
}

/// A `QuotaUsageUpdated` payload.
#[must_use]
pub fn quota_usage_updated() -> MailboxEvent {
    MailboxEvent::QuotaUsageUpdated(QuotaUsageUpdated {
        user: user(),
        quota_root: QuotaRoot::new("#private&bob@domain.tld"),
        count_quota: Quota::new(12, QuotaLimit::Limited(100)),
        size_quota: quota(),
        time: timestamp(),
    })
}

/// A `MessageMoved` payload.
#[must_use]
pub fn message_moved() -> MailboxEvent {
    MailboxEvent::MessageMoved(MessageMoved {
        user: user(),
        previous_mailbox_ids: vec![mailbox_id_of("18"), mailbox_id_of("19")],
        target_mailbox_ids: vec![mailbox_id_of("20")],
        message_ids: vec![message_id_of("42")],
    })
}

/// A `MessageContentDeleted` payload.
///
/// # Panics
///
/// Never; the blob ids are non-empty.
#[must_use]
pub fn message_content_deleted() -> MailboxEvent {
    MailboxEvent::MessageContentDeleted(MessageContentDeleted {
        user: user(),
        mailbox_id: mailbox_id(),
        message_id: message_id_of("42"),
        size: 12_345,
        internal_date: timestamp(),
        has_attachments: true,
        header_blob_id: BlobId::of("header-blob").unwrap(),
        body_blob_id: BlobId::of("body-blob").unwrap(),
    })
}

/// One payload of every variant.
#[must_use]
pub fn all_payloads() -> Vec<MailboxEvent> {
    vec![
        mailbox_added(),
        mailbox_deletion(),
        mailbox_renamed(),
        acl_updated(),
        mailbox_subscribed(),
        mailbox_unsubscribed(),
        messages_added(),
        messages_expunged(),
        flags_updated(),
        quota_usage_updated(),
        message_moved(),
        message_content_deleted(),
    ]
}

/// Wraps `payloads` into events of `aggregate`, numbered from `first`.
///
/// # Panics
///
/// Panics if `aggregate` is blank.
#[must_use]
pub fn events_of(
    aggregate: &str,
    first: u64,
    payloads: impl IntoIterator<Item = MailboxEvent>,
) -> Vec<Event<MailboxEvent>> {
    let aggregate_id = AggregateId::new(aggregate).unwrap();
    payloads
        .into_iter()
        .zip(first..)
        .map(|(payload, id)| Event::new(EventId::of(id), aggregate_id.clone(), payload))
        .collect()
}
