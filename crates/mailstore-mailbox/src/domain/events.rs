//! Mailbox domain events.
//!
//! The discriminator constants are part of the durable wire format.

use std::collections::BTreeMap;

use super::acl::{AclDiff, MailboxAcl};
use super::ids::{MailboxId, MessageId};
use super::message::{BlobId, MessageMetaData, MessageUid, SessionId, Timestamp, UpdatedFlags};
use super::path::MailboxPath;
use super::quota::{Quota, QuotaRoot};
use super::user::Username;

/// Discriminator of [`MailboxEvent::MailboxAdded`].
pub const MAILBOX_ADDED_EVENT_TYPE: &str = "MailboxAdded";
/// Discriminator of [`MailboxEvent::MailboxDeletion`].
pub const MAILBOX_DELETION_EVENT_TYPE: &str = "MailboxDeletion";
/// Discriminator of [`MailboxEvent::MailboxRenamed`].
pub const MAILBOX_RENAMED_EVENT_TYPE: &str = "MailboxRenamed";
/// Discriminator of [`MailboxEvent::AclUpdated`].
pub const MAILBOX_ACL_UPDATED_EVENT_TYPE: &str = "MailboxACLUpdated";
/// Discriminator of [`MailboxEvent::MailboxSubscribed`].
pub const MAILBOX_SUBSCRIBED_EVENT_TYPE: &str = "MailboxSubscribedEvent";
/// Discriminator of [`MailboxEvent::MailboxUnsubscribed`].
pub const MAILBOX_UNSUBSCRIBED_EVENT_TYPE: &str = "MailboxUnSubscribedEvent";
/// Discriminator of [`MailboxEvent::MessagesAdded`].
pub const MESSAGES_ADDED_EVENT_TYPE: &str = "Added";
/// Discriminator of [`MailboxEvent::MessagesExpunged`].
pub const MESSAGES_EXPUNGED_EVENT_TYPE: &str = "Expunged";
/// Discriminator of [`MailboxEvent::FlagsUpdated`].
pub const FLAGS_UPDATED_EVENT_TYPE: &str = "FlagsUpdated";
/// Discriminator of [`MailboxEvent::QuotaUsageUpdated`].
pub const QUOTA_USAGE_UPDATED_EVENT_TYPE: &str = "QuotaUsageUpdatedEvent";
/// Discriminator of [`MailboxEvent::MessageMoved`].
pub const MESSAGE_MOVED_EVENT_TYPE: &str = "MessageMoveEvent";
/// Discriminator of [`MailboxEvent::MessageContentDeleted`].
pub const MESSAGE_CONTENT_DELETED_EVENT_TYPE: &str = "MessageContentDeletionEvent";

/// Emitted when a mailbox is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxAdded {
    /// Path of the new mailbox.
    pub path: MailboxPath,
    /// Identifier of the new mailbox.
    pub mailbox_id: MailboxId,
    /// User who created it.
    pub user: Username,
    /// Session that created it.
    pub session_id: SessionId,
}

/// Emitted when a mailbox is deleted, with what it held at the time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxDeletion {
    /// Path of the deleted mailbox.
    pub path: MailboxPath,
    /// Identifier of the deleted mailbox.
    pub mailbox_id: MailboxId,
    /// User who deleted it.
    pub user: Username,
    /// Session that deleted it.
    pub session_id: SessionId,
    /// ACL the mailbox had.
    pub acl: MailboxAcl,
    /// Quota root the mailbox was charged to.
    pub quota_root: QuotaRoot,
    /// Messages released from the quota.
    pub deleted_message_count: Quota,
    /// Bytes released from the quota.
    pub total_deleted_size: Quota,
}

/// Emitted when a mailbox is renamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxRenamed {
    /// Path before the rename.
    pub path: MailboxPath,
    /// Path after the rename.
    pub new_path: MailboxPath,
    /// Identifier of the mailbox.
    pub mailbox_id: MailboxId,
    /// User who renamed it.
    pub user: Username,
    /// Session that renamed it.
    pub session_id: SessionId,
}

/// Emitted when the ACL of a mailbox changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclUpdated {
    /// Path of the mailbox.
    pub path: MailboxPath,
    /// Identifier of the mailbox.
    pub mailbox_id: MailboxId,
    /// User who changed the ACL.
    pub user: Username,
    /// Session that changed the ACL.
    pub session_id: SessionId,
    /// The ACL before and after.
    pub acl_diff: AclDiff,
}

/// Payload of subscription changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxSubscription {
    /// Path of the mailbox.
    pub path: MailboxPath,
    /// Identifier of the mailbox.
    pub mailbox_id: MailboxId,
    /// User whose subscriptions changed.
    pub user: Username,
    /// Session that made the change.
    pub session_id: SessionId,
}

/// Emitted when messages are added to a mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagesAdded {
    /// Path of the mailbox.
    pub path: MailboxPath,
    /// Identifier of the mailbox.
    pub mailbox_id: MailboxId,
    /// Owner of the session.
    pub user: Username,
    /// Session that added the messages.
    pub session_id: SessionId,
    /// Added messages, keyed by each entry's own uid.
    pub added: BTreeMap<MessageUid, MessageMetaData>,
    /// Whether the messages arrived through mail delivery.
    pub is_delivery: bool,
    /// Whether the messages were appended by a client.
    pub is_appended: bool,
}

/// Emitted when messages are expunged from a mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagesExpunged {
    /// Path of the mailbox.
    pub path: MailboxPath,
    /// Identifier of the mailbox.
    pub mailbox_id: MailboxId,
    /// Owner of the session.
    pub user: Username,
    /// Session that expunged the messages.
    pub session_id: SessionId,
    /// Expunged messages, keyed by each entry's own uid.
    pub expunged: BTreeMap<MessageUid, MessageMetaData>,
}

/// Emitted when flags of messages in a mailbox change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagsUpdated {
    /// Path of the mailbox.
    pub path: MailboxPath,
    /// Identifier of the mailbox.
    pub mailbox_id: MailboxId,
    /// Owner of the session.
    pub user: Username,
    /// Session that changed the flags.
    pub session_id: SessionId,
    /// One entry per updated message.
    pub updated_flags: Vec<UpdatedFlags>,
}

/// Emitted when the usage of a quota root changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaUsageUpdated {
    /// User charged.
    pub user: Username,
    /// Quota root charged.
    pub quota_root: QuotaRoot,
    /// Message count usage.
    pub count_quota: Quota,
    /// Size usage.
    pub size_quota: Quota,
    /// When the usage was computed.
    pub time: Timestamp,
}

/// Emitted when messages move between mailboxes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageMoved {
    /// User who moved the messages.
    pub user: Username,
    /// Mailboxes the messages were in.
    pub previous_mailbox_ids: Vec<MailboxId>,
    /// Mailboxes the messages are now in.
    pub target_mailbox_ids: Vec<MailboxId>,
    /// Moved messages.
    pub message_ids: Vec<MessageId>,
}

/// Emitted when the content of a message is no longer referenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContentDeleted {
    /// Owner of the message.
    pub user: Username,
    /// Last mailbox holding the message.
    pub mailbox_id: MailboxId,
    /// The deleted message.
    pub message_id: MessageId,
    /// Size in bytes.
    pub size: u64,
    /// IMAP internal date.
    pub internal_date: Timestamp,
    /// Whether the message carried attachments.
    pub has_attachments: bool,
    /// Blob holding the headers.
    pub header_blob_id: BlobId,
    /// Blob holding the body.
    pub body_blob_id: BlobId,
}

/// The closed set of mailbox events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailboxEvent {
    /// A mailbox has been created.
    MailboxAdded(MailboxAdded),
    /// A mailbox has been deleted.
    MailboxDeletion(MailboxDeletion),
    /// A mailbox has been renamed.
    MailboxRenamed(MailboxRenamed),
    /// A mailbox ACL has changed.
    AclUpdated(AclUpdated),
    /// A user subscribed to a mailbox.
    MailboxSubscribed(MailboxSubscription),
    /// A user unsubscribed from a mailbox.
    MailboxUnsubscribed(MailboxSubscription),
    /// Messages have been added.
    MessagesAdded(MessagesAdded),
    /// Messages have been expunged.
    MessagesExpunged(MessagesExpunged),
    /// Message flags have changed.
    FlagsUpdated(FlagsUpdated),
    /// Quota usage has changed.
    QuotaUsageUpdated(QuotaUsageUpdated),
    /// Messages have moved between mailboxes.
    MessageMoved(MessageMoved),
    /// Message content has been deleted.
    MessageContentDeleted(MessageContentDeleted),
}

impl MailboxEvent {
    /// Returns the discriminator used in the serialized form.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::MailboxAdded(_) => MAILBOX_ADDED_EVENT_TYPE,
            Self::MailboxDeletion(_) => MAILBOX_DELETION_EVENT_TYPE,
            Self::MailboxRenamed(_) => MAILBOX_RENAMED_EVENT_TYPE,
            Self::AclUpdated(_) => MAILBOX_ACL_UPDATED_EVENT_TYPE,
            Self::MailboxSubscribed(_) => MAILBOX_SUBSCRIBED_EVENT_TYPE,
            Self::MailboxUnsubscribed(_) => MAILBOX_UNSUBSCRIBED_EVENT_TYPE,
            Self::MessagesAdded(_) => MESSAGES_ADDED_EVENT_TYPE,
            Self::MessagesExpunged(_) => MESSAGES_EXPUNGED_EVENT_TYPE,
            Self::FlagsUpdated(_) => FLAGS_UPDATED_EVENT_TYPE,
            Self::QuotaUsageUpdated(_) => QUOTA_USAGE_UPDATED_EVENT_TYPE,
            Self::MessageMoved(_) => MESSAGE_MOVED_EVENT_TYPE,
            Self::MessageContentDeleted(_) => MESSAGE_CONTENT_DELETED_EVENT_TYPE,
        }
    }

    /// The user on whose behalf the event happened.
    #[must_use]
    pub fn user(&self) -> &Username {
        match self {
            Self::MailboxAdded(e) => &e.user,
            Self::MailboxDeletion(e) => &e.user,
            Self::MailboxRenamed(e) => &e.user,
            Self::AclUpdated(e) => &e.user,
            Self::MailboxSubscribed(e) | Self::MailboxUnsubscribed(e) => &e.user,
            Self::MessagesAdded(e) => &e.user,
            Self::MessagesExpunged(e) => &e.user,
            Self::FlagsUpdated(e) => &e.user,
            Self::QuotaUsageUpdated(e) => &e.user,
            Self::MessageMoved(e) => &e.user,
            Self::MessageContentDeleted(e) => &e.user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{IdFactory, NumericIdFactory};

    fn mailbox_id(raw: &str) -> MailboxId {
        NumericIdFactory::default().from_string(raw).unwrap()
    }

    fn subscription(user: &Username) -> MailboxSubscription {
        MailboxSubscription {
            path: MailboxPath::for_user(user.clone(), "INBOX"),
            mailbox_id: mailbox_id("1"),
            user: user.clone(),
            session_id: SessionId::of(7),
        }
    }

    #[test]
    fn test_subscription_variants_have_distinct_discriminators() {
        let user = Username::of("bob").unwrap();

        let subscribed = MailboxEvent::MailboxSubscribed(subscription(&user));
        let unsubscribed = MailboxEvent::MailboxUnsubscribed(subscription(&user));

        assert_eq!(subscribed.event_type(), "MailboxSubscribedEvent");
        assert_eq!(unsubscribed.event_type(), "MailboxUnSubscribedEvent");
    }

    #[test]
    fn test_user_is_exposed_for_every_shape() {
        let user = Username::of("alice@example.com").unwrap();
        let moved = MailboxEvent::MessageMoved(MessageMoved {
            user: user.clone(),
            previous_mailbox_ids: vec![],
            target_mailbox_ids: vec![mailbox_id("2")],
            message_ids: vec![NumericIdFactory::default().from_string("3").unwrap()],
        });
        let added = MailboxEvent::MailboxAdded(MailboxAdded {
            path: MailboxPath::for_user(user.clone(), "INBOX"),
            mailbox_id: mailbox_id("1"),
            user: user.clone(),
            session_id: SessionId::of(1),
        });

        assert_eq!(moved.user(), &user);
        assert_eq!(added.user(), &user);
        assert_eq!(moved.event_type(), MESSAGE_MOVED_EVENT_TYPE);
    }
}
