//! Field layout of each mailbox event variant.

use std::collections::BTreeMap;

use mailstore_core::error::DecodeError;
use serde_json::{Map, Value, json};

use super::MailboxEventCodec;
use super::fields::{Fields, as_u64};
use super::values::{
    decode_acl, decode_blob_id, decode_flags, decode_list, decode_path, decode_quota,
    decode_quota_root, decode_session_id, decode_timestamp, decode_uid, decode_username,
    encode_acl, encode_flags, encode_path, encode_quota, encode_quota_root, encode_session_id,
    encode_timestamp, encode_username,
};
use crate::domain::acl::AclDiff;
use crate::domain::events::{
    AclUpdated, FLAGS_UPDATED_EVENT_TYPE, FlagsUpdated, MAILBOX_ACL_UPDATED_EVENT_TYPE,
    MAILBOX_ADDED_EVENT_TYPE, MAILBOX_DELETION_EVENT_TYPE, MAILBOX_RENAMED_EVENT_TYPE,
    MAILBOX_SUBSCRIBED_EVENT_TYPE, MAILBOX_UNSUBSCRIBED_EVENT_TYPE,
    MESSAGE_CONTENT_DELETED_EVENT_TYPE, MESSAGE_MOVED_EVENT_TYPE, MESSAGES_ADDED_EVENT_TYPE,
    MESSAGES_EXPUNGED_EVENT_TYPE, MailboxAdded, MailboxDeletion, MailboxEvent, MailboxRenamed,
    MailboxSubscription, MessageContentDeleted, MessageMoved, MessagesAdded, MessagesExpunged,
    QUOTA_USAGE_UPDATED_EVENT_TYPE, QuotaUsageUpdated,
};
use crate::domain::ids::{MailboxId, MessageId};
use crate::domain::message::{MessageMetaData, MessageUid, ModSeq, SessionId, UpdatedFlags};
use crate::domain::path::MailboxPath;
use crate::domain::user::Username;

/// Decodes the field object of one variant.
pub(crate) type Decoder = fn(&MailboxEventCodec, &Fields<'_>) -> Result<MailboxEvent, DecodeError>;

/// Selects the decoder for a discriminator.
pub(crate) fn decoder_for(discriminator: &str) -> Option<Decoder> {
    let decoder: Decoder = match discriminator {
        MAILBOX_ADDED_EVENT_TYPE => decode_mailbox_added,
        MAILBOX_DELETION_EVENT_TYPE => decode_mailbox_deletion,
        MAILBOX_RENAMED_EVENT_TYPE => decode_mailbox_renamed,
        MAILBOX_ACL_UPDATED_EVENT_TYPE => decode_acl_updated,
        MAILBOX_SUBSCRIBED_EVENT_TYPE => decode_mailbox_subscribed,
        MAILBOX_UNSUBSCRIBED_EVENT_TYPE => decode_mailbox_unsubscribed,
        MESSAGES_ADDED_EVENT_TYPE => decode_messages_added,
        MESSAGES_EXPUNGED_EVENT_TYPE => decode_messages_expunged,
        FLAGS_UPDATED_EVENT_TYPE => decode_flags_updated,
        QUOTA_USAGE_UPDATED_EVENT_TYPE => decode_quota_usage_updated,
        MESSAGE_MOVED_EVENT_TYPE => decode_message_moved,
        MESSAGE_CONTENT_DELETED_EVENT_TYPE => decode_message_content_deleted,
        _ => return None,
    };
    Some(decoder)
}

/// Encodes the variant-specific fields of `payload`.
pub(crate) fn encode_payload(payload: &MailboxEvent) -> Map<String, Value> {
    match payload {
        MailboxEvent::MailboxAdded(e) => {
            mailbox_scope("mailboxPath", &e.path, &e.mailbox_id, &e.user, e.session_id)
        }
        MailboxEvent::MailboxDeletion(e) => {
            let mut fields =
                mailbox_scope("mailboxPath", &e.path, &e.mailbox_id, &e.user, e.session_id);
            fields.insert("mailboxACL".into(), encode_acl(&e.acl));
            fields.insert("quotaRoot".into(), encode_quota_root(&e.quota_root));
            fields.insert("deletedMessageCount".into(), encode_quota(&e.deleted_message_count));
            fields.insert("totalDeletedSize".into(), encode_quota(&e.total_deleted_size));
            fields
        }
        MailboxEvent::MailboxRenamed(e) => {
            let mut fields =
                mailbox_scope("mailboxPath", &e.path, &e.mailbox_id, &e.user, e.session_id);
            fields.insert("newMailboxPath".into(), encode_path(&e.new_path));
            fields
        }
        MailboxEvent::AclUpdated(e) => {
            let mut fields =
                mailbox_scope("mailboxPath", &e.path, &e.mailbox_id, &e.user, e.session_id);
            fields.insert(
                "aclDiff".into(),
                json!({
                    "oldACL": encode_acl(&e.acl_diff.old_acl),
                    "newACL": encode_acl(&e.acl_diff.new_acl),
                }),
            );
            fields
        }
        MailboxEvent::MailboxSubscribed(e) | MailboxEvent::MailboxUnsubscribed(e) => {
            mailbox_scope("mailboxPath", &e.path, &e.mailbox_id, &e.user, e.session_id)
        }
        MailboxEvent::MessagesAdded(e) => {
            let mut fields = mailbox_scope("path", &e.path, &e.mailbox_id, &e.user, e.session_id);
            fields.insert("added".into(), encode_metadata_map(&e.added));
            fields.insert("isDelivery".into(), json!(e.is_delivery));
            fields.insert("isAppended".into(), json!(e.is_appended));
            fields
        }
        MailboxEvent::MessagesExpunged(e) => {
            let mut fields = mailbox_scope("path", &e.path, &e.mailbox_id, &e.user, e.session_id);
            fields.insert("expunged".into(), encode_metadata_map(&e.expunged));
            fields
        }
        MailboxEvent::FlagsUpdated(e) => {
            let mut fields = mailbox_scope("path", &e.path, &e.mailbox_id, &e.user, e.session_id);
            fields.insert(
                "updatedFlags".into(),
                Value::Array(e.updated_flags.iter().map(encode_updated_flags).collect()),
            );
            fields
        }
        MailboxEvent::QuotaUsageUpdated(e) => object([
            ("user", encode_username(&e.user)),
            ("quotaRoot", encode_quota_root(&e.quota_root)),
            ("countQuota", encode_quota(&e.count_quota)),
            ("sizeQuota", encode_quota(&e.size_quota)),
            ("time", encode_timestamp(&e.time)),
        ]),
        MailboxEvent::MessageMoved(e) => object([
            ("user", encode_username(&e.user)),
            ("previousMailboxIds", id_list(e.previous_mailbox_ids.iter().map(MailboxId::as_str))),
            ("targetMailboxIds", id_list(e.target_mailbox_ids.iter().map(MailboxId::as_str))),
            ("messageIds", id_list(e.message_ids.iter().map(MessageId::as_str))),
        ]),
        MailboxEvent::MessageContentDeleted(e) => object([
            ("user", encode_username(&e.user)),
            ("mailboxId", json!(e.mailbox_id.as_str())),
            ("messageId", json!(e.message_id.as_str())),
            ("size", json!(e.size)),
            ("internalDate", encode_timestamp(&e.internal_date)),
            ("hasAttachments", json!(e.has_attachments)),
            ("headerBlobId", json!(e.header_blob_id.as_str())),
            ("bodyBlobId", json!(e.body_blob_id.as_str())),
        ]),
    }
}

fn object<const N: usize>(fields: [(&str, Value); N]) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(name, value)| (name.to_owned(), value))
        .collect()
}

fn id_list<'a>(ids: impl Iterator<Item = &'a str>) -> Value {
    Value::Array(ids.map(|id| json!(id)).collect())
}

fn mailbox_scope(
    path_field: &str,
    path: &MailboxPath,
    mailbox_id: &MailboxId,
    user: &Username,
    session_id: SessionId,
) -> Map<String, Value> {
    object([
        (path_field, encode_path(path)),
        ("mailboxId", json!(mailbox_id.as_str())),
        ("user", encode_username(user)),
        ("sessionId", encode_session_id(session_id)),
    ])
}

/// Fields shared by every event scoped to one mailbox.
struct MailboxScope {
    path: MailboxPath,
    mailbox_id: MailboxId,
    user: Username,
    session_id: SessionId,
}

fn decode_scope(
    codec: &MailboxEventCodec,
    fields: &Fields<'_>,
    path_field: &str,
) -> Result<MailboxScope, DecodeError> {
    Ok(MailboxScope {
        path: fields.required(path_field, decode_path)?,
        mailbox_id: fields.required("mailboxId", |p, v| codec.mailbox_id(p, v))?,
        user: fields.required("user", decode_username)?,
        session_id: fields.required("sessionId", decode_session_id)?,
    })
}

fn decode_mailbox_added(
    codec: &MailboxEventCodec,
    fields: &Fields<'_>,
) -> Result<MailboxEvent, DecodeError> {
    let scope = decode_scope(codec, fields, "mailboxPath")?;
    Ok(MailboxEvent::MailboxAdded(MailboxAdded {
        path: scope.path,
        mailbox_id: scope.mailbox_id,
        user: scope.user,
        session_id: scope.session_id,
    }))
}

fn decode_mailbox_deletion(
    codec: &MailboxEventCodec,
    fields: &Fields<'_>,
) -> Result<MailboxEvent, DecodeError> {
    let scope = decode_scope(codec, fields, "mailboxPath")?;
    Ok(MailboxEvent::MailboxDeletion(MailboxDeletion {
        path: scope.path,
        mailbox_id: scope.mailbox_id,
        user: scope.user,
        session_id: scope.session_id,
        acl: fields.required("mailboxACL", decode_acl)?,
        quota_root: fields.required("quotaRoot", decode_quota_root)?,
        deleted_message_count: fields.required("deletedMessageCount", decode_quota)?,
        total_deleted_size: fields.required("totalDeletedSize", decode_quota)?,
    }))
}

fn decode_mailbox_renamed(
    codec: &MailboxEventCodec,
    fields: &Fields<'_>,
) -> Result<MailboxEvent, DecodeError> {
    let scope = decode_scope(codec, fields, "mailboxPath")?;
    Ok(MailboxEvent::MailboxRenamed(MailboxRenamed {
        path: scope.path,
        new_path: fields.required("newMailboxPath", decode_path)?,
        mailbox_id: scope.mailbox_id,
        user: scope.user,
        session_id: scope.session_id,
    }))
}

fn decode_acl_updated(
    codec: &MailboxEventCodec,
    fields: &Fields<'_>,
) -> Result<MailboxEvent, DecodeError> {
    let scope = decode_scope(codec, fields, "mailboxPath")?;
    let diff = fields.object("aclDiff")?;
    Ok(MailboxEvent::AclUpdated(AclUpdated {
        path: scope.path,
        mailbox_id: scope.mailbox_id,
        user: scope.user,
        session_id: scope.session_id,
        acl_diff: AclDiff::new(
            diff.required("oldACL", decode_acl)?,
            diff.required("newACL", decode_acl)?,
        ),
    }))
}

fn decode_subscription(
    codec: &MailboxEventCodec,
    fields: &Fields<'_>,
) -> Result<MailboxSubscription, DecodeError> {
    let scope = decode_scope(codec, fields, "mailboxPath")?;
    Ok(MailboxSubscription {
        path: scope.path,
        mailbox_id: scope.mailbox_id,
        user: scope.user,
        session_id: scope.session_id,
    })
}

fn decode_mailbox_subscribed(
    codec: &MailboxEventCodec,
    fields: &Fields<'_>,
) -> Result<MailboxEvent, DecodeError> {
    decode_subscription(codec, fields).map(MailboxEvent::MailboxSubscribed)
}

fn decode_mailbox_unsubscribed(
    codec: &MailboxEventCodec,
    fields: &Fields<'_>,
) -> Result<MailboxEvent, DecodeError> {
    decode_subscription(codec, fields).map(MailboxEvent::MailboxUnsubscribed)
}

fn decode_messages_added(
    codec: &MailboxEventCodec,
    fields: &Fields<'_>,
) -> Result<MailboxEvent, DecodeError> {
    let scope = decode_scope(codec, fields, "path")?;
    Ok(MailboxEvent::MessagesAdded(MessagesAdded {
        path: scope.path,
        mailbox_id: scope.mailbox_id,
        user: scope.user,
        session_id: scope.session_id,
        added: decode_metadata_map(codec, fields, "added")?,
        is_delivery: fields.flag("isDelivery")?,
        is_appended: fields.flag("isAppended")?,
    }))
}

fn decode_messages_expunged(
    codec: &MailboxEventCodec,
    fields: &Fields<'_>,
) -> Result<MailboxEvent, DecodeError> {
    let scope = decode_scope(codec, fields, "path")?;
    Ok(MailboxEvent::MessagesExpunged(MessagesExpunged {
        path: scope.path,
        mailbox_id: scope.mailbox_id,
        user: scope.user,
        session_id: scope.session_id,
        expunged: decode_metadata_map(codec, fields, "expunged")?,
    }))
}

fn decode_flags_updated(
    codec: &MailboxEventCodec,
    fields: &Fields<'_>,
) -> Result<MailboxEvent, DecodeError> {
    let scope = decode_scope(codec, fields, "path")?;
    let updated_flags = fields.required("updatedFlags", |path, value| {
        decode_list(path, value, |path, value| decode_updated_flags(codec, path, value))
    })?;
    Ok(MailboxEvent::FlagsUpdated(FlagsUpdated {
        path: scope.path,
        mailbox_id: scope.mailbox_id,
        user: scope.user,
        session_id: scope.session_id,
        updated_flags,
    }))
}

fn decode_quota_usage_updated(
    _codec: &MailboxEventCodec,
    fields: &Fields<'_>,
) -> Result<MailboxEvent, DecodeError> {
    Ok(MailboxEvent::QuotaUsageUpdated(QuotaUsageUpdated {
        user: fields.required("user", decode_username)?,
        quota_root: fields.required("quotaRoot", decode_quota_root)?,
        count_quota: fields.required("countQuota", decode_quota)?,
        size_quota: fields.required("sizeQuota", decode_quota)?,
        time: fields.required("time", decode_timestamp)?,
    }))
}

fn decode_message_moved(
    codec: &MailboxEventCodec,
    fields: &Fields<'_>,
) -> Result<MailboxEvent, DecodeError> {
    let mailbox_ids = |path: &str, value: &Value| {
        decode_list(path, value, |path, value| codec.mailbox_id(path, value))
    };
    Ok(MailboxEvent::MessageMoved(MessageMoved {
        user: fields.required("user", decode_username)?,
        previous_mailbox_ids: fields.required("previousMailboxIds", mailbox_ids)?,
        target_mailbox_ids: fields.required("targetMailboxIds", mailbox_ids)?,
        message_ids: fields.required("messageIds", |path, value| {
            decode_list(path, value, |path, value| codec.message_id(path, value))
        })?,
    }))
}

fn decode_message_content_deleted(
    codec: &MailboxEventCodec,
    fields: &Fields<'_>,
) -> Result<MailboxEvent, DecodeError> {
    Ok(MailboxEvent::MessageContentDeleted(MessageContentDeleted {
        user: fields.required("user", decode_username)?,
        mailbox_id: fields.required("mailboxId", |p, v| codec.mailbox_id(p, v))?,
        message_id: fields.required("messageId", |p, v| codec.message_id(p, v))?,
        size: fields.u64("size")?,
        internal_date: fields.required("internalDate", decode_timestamp)?,
        has_attachments: fields.bool("hasAttachments")?,
        header_blob_id: fields.required("headerBlobId", decode_blob_id)?,
        body_blob_id: fields.required("bodyBlobId", decode_blob_id)?,
    }))
}

fn encode_metadata(metadata: &MessageMetaData) -> Value {
    let mut fields = object([
        ("uid", json!(metadata.uid.value())),
        ("modSeq", json!(metadata.mod_seq.value())),
        ("flags", encode_flags(&metadata.flags)),
        ("size", json!(metadata.size)),
        ("internalDate", encode_timestamp(&metadata.internal_date)),
        ("messageId", json!(metadata.message_id.as_str())),
    ]);
    if let Some(thread_id) = &metadata.thread_id {
        fields.insert("threadId".into(), json!(thread_id.as_str()));
    }
    Value::Object(fields)
}

fn encode_metadata_map(entries: &BTreeMap<MessageUid, MessageMetaData>) -> Value {
    let map: Map<String, Value> = entries
        .iter()
        .map(|(uid, metadata)| (uid.to_string(), encode_metadata(metadata)))
        .collect();
    Value::Object(map)
}

fn decode_metadata(
    codec: &MailboxEventCodec,
    path: &str,
    value: &Value,
) -> Result<MessageMetaData, DecodeError> {
    let fields = Fields::of(path, value)?;
    Ok(MessageMetaData {
        uid: fields.required("uid", decode_uid)?,
        mod_seq: fields.u64("modSeq").map(ModSeq::of)?,
        flags: fields.required("flags", decode_flags)?,
        size: fields.u64("size")?,
        internal_date: fields.required("internalDate", decode_timestamp)?,
        message_id: fields.required("messageId", |p, v| codec.message_id(p, v))?,
        thread_id: fields.optional("threadId", |p, v| codec.message_id(p, v))?,
    })
}

fn decode_metadata_map(
    codec: &MailboxEventCodec,
    fields: &Fields<'_>,
    name: &str,
) -> Result<BTreeMap<MessageUid, MessageMetaData>, DecodeError> {
    let entries = fields.object(name)?;
    let mut decoded = BTreeMap::new();
    for (path, key, value) in entries.entries() {
        let uid = key
            .parse::<u64>()
            .ok()
            .and_then(|raw| MessageUid::of(raw).ok())
            .filter(|uid| uid.to_string() == *key)
            .ok_or_else(|| DecodeError::malformed(&path, format!("key {key:?} is not a uid")))?;
        let metadata = decode_metadata(codec, &path, value)?;
        if metadata.uid != uid {
            return Err(DecodeError::malformed(
                &path,
                format!("key {uid} disagrees with uid {}", metadata.uid),
            ));
        }
        decoded.insert(uid, metadata);
    }
    Ok(decoded)
}

fn encode_updated_flags(updated: &UpdatedFlags) -> Value {
    let mut fields = object([
        ("uid", json!(updated.uid.value())),
        ("modSeq", json!(updated.mod_seq.value())),
        ("oldFlags", encode_flags(&updated.old_flags)),
        ("newFlags", encode_flags(&updated.new_flags)),
    ]);
    if let Some(message_id) = &updated.message_id {
        fields.insert("messageId".into(), json!(message_id.as_str()));
    }
    Value::Object(fields)
}

fn decode_updated_flags(
    codec: &MailboxEventCodec,
    path: &str,
    value: &Value,
) -> Result<UpdatedFlags, DecodeError> {
    let fields = Fields::of(path, value)?;
    Ok(UpdatedFlags {
        uid: fields.required("uid", decode_uid)?,
        message_id: fields.optional("messageId", |p, v| codec.message_id(p, v))?,
        mod_seq: fields.required("modSeq", as_u64).map(ModSeq::of)?,
        old_flags: fields.required("oldFlags", decode_flags)?,
        new_flags: fields.required("newFlags", decode_flags)?,
    })
}

