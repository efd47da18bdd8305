//! Codecs for the value types shared by several events.

use mailstore_core::error::{DecodeError, DecodeErrorKind, DomainError};
use serde_json::{Map, Value, json};

use super::fields::{Fields, as_array, as_i64, as_object, as_str, as_u64, element};
use super::timestamp;
use crate::domain::acl::{EntryKey, MailboxAcl, Rights};
use crate::domain::flags::{Flags, SystemFlag};
use crate::domain::message::{BlobId, MessageUid, SessionId, Timestamp};
use crate::domain::path::MailboxPath;
use crate::domain::quota::{Quota, QuotaLimit, QuotaRoot, QuotaScope};
use crate::domain::user::Username;

/// Turns a value-constructor rejection into a decode failure at `path`.
pub(crate) fn malformed_at(path: &str) -> impl FnOnce(DomainError) -> DecodeError + '_ {
    move |err| match err {
        DomainError::InvalidArgument(reason) => DecodeError::malformed(path, reason),
        other => DecodeError::malformed(path, other.to_string()),
    }
}

/// Decodes a JSON array, element by element.
pub(crate) fn decode_list<T>(
    path: &str,
    value: &Value,
    decode: impl Fn(&str, &Value) -> Result<T, DecodeError>,
) -> Result<Vec<T>, DecodeError> {
    as_array(path, value)?
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let path = element(path, index);
            if item.is_null() {
                return Err(DecodeError::wrong_type(path, "non-null element"));
            }
            decode(&path, item)
        })
        .collect()
}

pub(crate) fn encode_username(user: &Username) -> Value {
    Value::String(user.as_string())
}

pub(crate) fn decode_username(path: &str, value: &Value) -> Result<Username, DecodeError> {
    Username::of(as_str(path, value)?).map_err(malformed_at(path))
}

pub(crate) fn encode_session_id(session_id: SessionId) -> Value {
    json!(session_id.value())
}

pub(crate) fn decode_session_id(path: &str, value: &Value) -> Result<SessionId, DecodeError> {
    as_i64(path, value).map(SessionId::of)
}

pub(crate) fn decode_uid(path: &str, value: &Value) -> Result<MessageUid, DecodeError> {
    MessageUid::of(as_u64(path, value)?).map_err(malformed_at(path))
}

pub(crate) fn decode_blob_id(path: &str, value: &Value) -> Result<BlobId, DecodeError> {
    BlobId::of(as_str(path, value)?).map_err(malformed_at(path))
}

pub(crate) fn encode_path(mailbox_path: &MailboxPath) -> Value {
    let mut object = Map::new();
    if let Some(namespace) = mailbox_path.namespace() {
        object.insert("namespace".into(), json!(namespace));
    }
    if let Some(user) = mailbox_path.user() {
        object.insert("user".into(), encode_username(user));
    }
    object.insert("name".into(), json!(mailbox_path.name()));
    Value::Object(object)
}

pub(crate) fn decode_path(path: &str, value: &Value) -> Result<MailboxPath, DecodeError> {
    let fields = Fields::of(path, value)?;
    Ok(MailboxPath::new(
        fields.optional_string("namespace")?.map(str::to_owned),
        fields.optional("user", decode_username)?,
        fields.string("name")?,
    ))
}

pub(crate) fn encode_flags(flags: &Flags) -> Value {
    json!({
        "systemFlags": flags.system_flags().map(SystemFlag::name).collect::<Vec<_>>(),
        "userFlags": flags.user_flags().collect::<Vec<_>>(),
    })
}

pub(crate) fn decode_flags(path: &str, value: &Value) -> Result<Flags, DecodeError> {
    let fields = Fields::of(path, value)?;
    let system = fields.required("systemFlags", |path, value| {
        decode_list(path, value, |path, value| {
            let name = as_str(path, value)?;
            SystemFlag::from_name(name)
                .ok_or_else(|| DecodeError::malformed(path, format!("unknown system flag {name:?}")))
        })
    })?;
    let user = fields.required("userFlags", |path, value| {
        decode_list(path, value, |path, value| as_str(path, value).map(str::to_owned))
    })?;
    Flags::new(system, user).map_err(malformed_at(fields.path()))
}

pub(crate) fn encode_timestamp(value: &Timestamp) -> Value {
    Value::String(timestamp::format(value))
}

pub(crate) fn decode_timestamp(path: &str, value: &Value) -> Result<Timestamp, DecodeError> {
    let raw = as_str(path, value)?;
    let instant = timestamp::parse(raw)
        .map_err(|reason| DecodeError::malformed(path, format!("{raw:?}: {reason}")))?;
    Timestamp::new(instant).map_err(malformed_at(path))
}

pub(crate) fn encode_quota_root(root: &QuotaRoot) -> Value {
    json!(root.as_str())
}

pub(crate) fn decode_quota_root(path: &str, value: &Value) -> Result<QuotaRoot, DecodeError> {
    as_str(path, value).map(QuotaRoot::new)
}

fn encode_limit(limit: QuotaLimit) -> Value {
    match limit {
        QuotaLimit::Limited(limit) => json!(limit),
        QuotaLimit::Unlimited => Value::Null,
    }
}

fn decode_limit(path: &str, value: Option<&Value>) -> Result<QuotaLimit, DecodeError> {
    match value {
        None | Some(Value::Null) => Ok(QuotaLimit::Unlimited),
        Some(value) => as_u64(path, value).map(QuotaLimit::Limited),
    }
}

pub(crate) fn encode_quota(quota: &Quota) -> Value {
    let limits: Map<String, Value> = quota
        .scoped_limits()
        .map(|(scope, limit)| (scope.name().to_owned(), encode_limit(limit)))
        .collect();
    json!({
        "used": quota.used(),
        "limit": encode_limit(quota.limit()),
        "limits": limits,
    })
}

pub(crate) fn decode_quota(path: &str, value: &Value) -> Result<Quota, DecodeError> {
    let fields = Fields::of(path, value)?;
    let used = fields.u64("used")?;
    let limit_path = format!("{path}.limit");
    let limit = decode_limit(&limit_path, as_object(path, value)?.get("limit"))?;

    let mut quota = Quota::new(used, limit);
    if let Some(limits) = fields.optional("limits", |path, value| Fields::of(path, value))? {
        for (path, scope, limit) in limits.entries() {
            let scope = QuotaScope::from_name(scope).ok_or_else(|| {
                DecodeError::malformed(&path, format!("unknown quota scope {scope:?}"))
            })?;
            quota = quota.with_scoped_limit(scope, decode_limit(&path, Some(limit))?);
        }
    }
    Ok(quota)
}

pub(crate) fn decode_rights(path: &str, value: &Value) -> Result<Rights, DecodeError> {
    let codes = value
        .as_str()
        .ok_or_else(|| DecodeError::wrong_type(path, "rights string"))?;
    Rights::parse(codes).map_err(|c| DecodeError::new(path, DecodeErrorKind::UnsupportedRight(c)))
}

pub(crate) fn encode_acl(acl: &MailboxAcl) -> Value {
    let entries: Map<String, Value> = acl
        .entries()
        .map(|(key, rights)| (key.to_string(), Value::String(rights.to_string())))
        .collect();
    json!({ "entries": entries })
}

pub(crate) fn decode_acl(path: &str, value: &Value) -> Result<MailboxAcl, DecodeError> {
    let fields = Fields::of(path, value)?;
    let entries = fields.object("entries")?;
    let mut decoded = Vec::new();
    for (path, key, rights) in entries.entries() {
        let key = EntryKey::parse(key).map_err(malformed_at(&path))?;
        decoded.push((key, decode_rights(&path, rights)?));
    }
    Ok(MailboxAcl::of(decoded))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::acl::Right;

    #[test]
    fn test_path_without_namespace_and_user() {
        let value = json!({"namespace": null, "name": "INBOX"});

        let path = decode_path("p", &value).unwrap();

        assert_eq!(path, MailboxPath::new(None, None, "INBOX"));
        assert_eq!(encode_path(&path), json!({"name": "INBOX"}));
    }

    #[test]
    fn test_path_requires_name() {
        let value = json!({"namespace": "#private", "user": "bob"});

        assert_eq!(
            decode_path("p", &value).unwrap_err(),
            DecodeError::missing("p.name")
        );
    }

    #[test]
    fn test_flags_reject_unknown_system_flag() {
        let value = json!({"systemFlags": ["Seen", "Unknown"], "userFlags": []});

        let err = decode_flags("f", &value).unwrap_err();

        assert_eq!(err.path, "f.systemFlags[1]");
        assert!(matches!(err.kind, DecodeErrorKind::MalformedValue(_)));
    }

    #[test]
    fn test_flags_reject_null_user_flag() {
        let value = json!({"systemFlags": [], "userFlags": ["a", null]});

        let err = decode_flags("f", &value).unwrap_err();

        assert_eq!(err.path, "f.userFlags[1]");
    }

    #[test]
    fn test_quota_null_limits_are_unlimited() {
        let value = json!({"used": 12, "limit": null, "limits": {"Global": null, "User": 100}});

        let quota = decode_quota("q", &value).unwrap();

        assert_eq!(quota.limit(), QuotaLimit::Unlimited);
        assert_eq!(
            quota.scoped_limits().collect::<Vec<_>>(),
            vec![
                (QuotaScope::Global, QuotaLimit::Unlimited),
                (QuotaScope::User, QuotaLimit::Limited(100)),
            ]
        );
        assert_eq!(encode_quota(&quota), value);
    }

    #[test]
    fn test_quota_requires_used() {
        let value = json!({"limit": 3});

        assert_eq!(
            decode_quota("q", &value).unwrap_err(),
            DecodeError::missing("q.used")
        );
    }

    #[test]
    fn test_quota_rejects_unknown_scope() {
        let value = json!({"used": 1, "limit": 3, "limits": {"Planet": 3}});

        assert_eq!(decode_quota("q", &value).unwrap_err().path, "q.limits.Planet");
    }

    #[test]
    fn test_empty_quota_root_is_valid() {
        assert_eq!(
            decode_quota_root("r", &json!("")).unwrap(),
            QuotaRoot::new("")
        );
    }

    #[test]
    fn test_repeated_rights_decode_like_single() {
        assert_eq!(
            decode_rights("r", &json!("aa")).unwrap(),
            decode_rights("r", &json!("a")).unwrap()
        );
    }

    #[test]
    fn test_unsupported_right() {
        assert_eq!(
            decode_rights("r", &json!("az")).unwrap_err().kind,
            DecodeErrorKind::UnsupportedRight('z')
        );
    }

    #[test]
    fn test_null_rights_fail() {
        let value = json!({"entries": {"bob": null}});

        let err = decode_acl("acl", &value).unwrap_err();

        assert_eq!(err.path, "acl.entries.bob");
        assert_eq!(
            err.kind,
            DecodeErrorKind::WrongType {
                expected: "rights string"
            }
        );
    }

    #[test]
    fn test_acl_rejects_prefix_only_key() {
        let value = json!({"entries": {"-": "a"}});

        let err = decode_acl("acl", &value).unwrap_err();

        assert!(matches!(err.kind, DecodeErrorKind::MalformedValue(_)));
    }

    #[test]
    fn test_acl_encoding() {
        let acl = MailboxAcl::of([
            (EntryKey::parse("-$team").unwrap(), Rights::of([Right::Read])),
            (EntryKey::user("bob").unwrap(), Rights::parse("lra").unwrap()),
        ]);

        let encoded = encode_acl(&acl);

        assert_eq!(encoded, json!({"entries": {"-$team": "r", "bob": "alr"}}));
        assert_eq!(decode_acl("acl", &encoded).unwrap(), acl);
    }

    #[test]
    fn test_list_rejects_non_array_and_null() {
        let decode = |path: &str, value: &Value| as_str(path, value).map(str::to_owned);

        assert!(decode_list("l", &Value::Null, decode).is_err());
        assert!(decode_list("l", &json!("a"), decode).is_err());
        assert_eq!(decode_list("l", &json!([]), decode).unwrap(), Vec::<String>::new());
    }
}
