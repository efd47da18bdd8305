//! Mailbox access control lists (RFC 4314).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use mailstore_core::error::DomainError;

/// One RFC 4314 right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Right {
    /// `a`
    Administer,
    /// `e`
    PerformExpunge,
    /// `i`
    Insert,
    /// `k`
    CreateMailbox,
    /// `l`
    Lookup,
    /// `p`
    Post,
    /// `r`
    Read,
    /// `s`
    WriteSeenFlag,
    /// `t`
    DeleteMessages,
    /// `w`
    Write,
    /// `x`
    DeleteMailbox,
}

impl Right {
    /// Every right, in serialization order.
    pub const ALL: [Self; 11] = [
        Self::Administer,
        Self::PerformExpunge,
        Self::Insert,
        Self::CreateMailbox,
        Self::Lookup,
        Self::Post,
        Self::Read,
        Self::WriteSeenFlag,
        Self::DeleteMessages,
        Self::Write,
        Self::DeleteMailbox,
    ];

    /// The single-character code of this right.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Administer => 'a',
            Self::PerformExpunge => 'e',
            Self::Insert => 'i',
            Self::CreateMailbox => 'k',
            Self::Lookup => 'l',
            Self::Post => 'p',
            Self::Read => 'r',
            Self::WriteSeenFlag => 's',
            Self::DeleteMessages => 't',
            Self::Write => 'w',
            Self::DeleteMailbox => 'x',
        }
    }

    /// Looks a right up by its code.
    #[must_use]
    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|right| right.code() == code)
    }
}

/// A set of rights. Repeated rights collapse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Rights(BTreeSet<Right>);

impl Rights {
    /// No right at all.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Every right.
    #[must_use]
    pub fn full() -> Self {
        Self::of(Right::ALL)
    }

    /// Builds a set from individual rights.
    #[must_use]
    pub fn of(rights: impl IntoIterator<Item = Right>) -> Self {
        Self(rights.into_iter().collect())
    }

    /// Parses a string of right codes.
    ///
    /// # Errors
    ///
    /// Returns the first character that is not a right code.
    pub fn parse(codes: &str) -> Result<Self, char> {
        codes
            .chars()
            .map(|c| Right::from_code(c).ok_or(c))
            .collect::<Result<BTreeSet<_>, _>>()
            .map(Self)
    }

    /// Whether `right` is granted.
    #[must_use]
    pub fn contains(&self, right: Right) -> bool {
        self.0.contains(&right)
    }

    /// Rights in serialization order.
    pub fn iter(&self) -> impl Iterator<Item = Right> + '_ {
        self.0.iter().copied()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Rights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|right| write!(f, "{}", right.code()))
    }
}

/// What kind of principal an ACL entry names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NameType {
    /// A single user.
    User,
    /// A group, serialized with a `$` marker.
    Group,
    /// One of `owner`, `anyone`, `authenticated`.
    Special,
}

/// Principal of an ACL entry, possibly negative.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryKey {
    name_type: NameType,
    name: String,
    negative: bool,
}

const GROUP_MARKER: char = '$';
const NEGATIVE_MARKER: char = '-';
const POSITIVE_MARKER: char = '+';

impl EntryKey {
    /// Names reserved for special entries.
    pub const SPECIAL_NAMES: [&'static str; 3] = ["owner", "anyone", "authenticated"];

    /// Builds an entry key.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` if `name` is empty, starts with
    /// a marker character, or disagrees with `name_type` about being special.
    pub fn new(
        name: impl Into<String>,
        name_type: NameType,
        negative: bool,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.is_empty() {
            return Err(DomainError::InvalidArgument("ACL entry name must not be empty".into()));
        }
        if name.starts_with([GROUP_MARKER, NEGATIVE_MARKER, POSITIVE_MARKER]) {
            return Err(DomainError::InvalidArgument(format!(
                "ACL entry name {name:?} starts with a marker character"
            )));
        }
        let special = Self::SPECIAL_NAMES.contains(&name.as_str());
        match name_type {
            NameType::Special if !special => {
                return Err(DomainError::InvalidArgument(format!(
                    "{name:?} is not a special ACL name"
                )));
            }
            NameType::User if special => {
                return Err(DomainError::InvalidArgument(format!(
                    "{name:?} is reserved for special ACL entries"
                )));
            }
            _ => {}
        }
        Ok(Self {
            name_type,
            name,
            negative,
        })
    }

    /// A positive user entry.
    ///
    /// # Errors
    ///
    /// See [`EntryKey::new`].
    pub fn user(name: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(name, NameType::User, false)
    }

    /// A positive group entry.
    ///
    /// # Errors
    ///
    /// See [`EntryKey::new`].
    pub fn group(name: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(name, NameType::Group, false)
    }

    /// Parses the serialized form: an optional `-` or `+` sign, an optional
    /// `$` group marker, then a non-empty name.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` if no name follows the markers.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let (negative, rest) = if let Some(rest) = raw.strip_prefix(NEGATIVE_MARKER) {
            (true, rest)
        } else {
            (false, raw.strip_prefix(POSITIVE_MARKER).unwrap_or(raw))
        };
        let (group, name) = match rest.strip_prefix(GROUP_MARKER) {
            Some(name) => (true, name),
            None => (false, rest),
        };
        if name.is_empty() {
            return Err(DomainError::InvalidArgument(format!(
                "ACL entry key {raw:?} has no name"
            )));
        }
        let name_type = if group {
            NameType::Group
        } else if Self::SPECIAL_NAMES.contains(&name) {
            NameType::Special
        } else {
            NameType::User
        };
        Self::new(name, name_type, negative)
    }

    /// The principal name, without markers.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The principal kind.
    #[must_use]
    pub fn name_type(&self) -> NameType {
        self.name_type
    }

    /// Whether the entry revokes rather than grants.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.negative
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "{NEGATIVE_MARKER}")?;
        }
        if self.name_type == NameType::Group {
            write!(f, "{GROUP_MARKER}")?;
        }
        f.write_str(&self.name)
    }
}

/// A mailbox ACL: rights per entry key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailboxAcl(BTreeMap<EntryKey, Rights>);

impl MailboxAcl {
    /// The ACL granting nothing to anyone.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The ACL every new mailbox starts with: full rights for its owner.
    #[must_use]
    pub fn owner_full_rights() -> Self {
        let owner = EntryKey {
            name_type: NameType::Special,
            name: "owner".to_owned(),
            negative: false,
        };
        Self(BTreeMap::from([(owner, Rights::full())]))
    }

    /// Builds an ACL from entries. A later entry for the same key wins.
    #[must_use]
    pub fn of(entries: impl IntoIterator<Item = (EntryKey, Rights)>) -> Self {
        Self(entries.into_iter().collect())
    }

    /// Returns a copy with `key` granted `rights`.
    #[must_use]
    pub fn with_entry(&self, key: EntryKey, rights: Rights) -> Self {
        let mut entries = self.0.clone();
        entries.insert(key, rights);
        Self(entries)
    }

    /// Rights recorded for `key`.
    #[must_use]
    pub fn rights_of(&self, key: &EntryKey) -> Option<&Rights> {
        self.0.get(key)
    }

    /// Entries ordered by key.
    pub fn entries(&self) -> impl Iterator<Item = (&EntryKey, &Rights)> {
        self.0.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the ACL has no entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The ACL of a mailbox before and after an update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AclDiff {
    /// ACL before the update.
    pub old_acl: MailboxAcl,
    /// ACL after the update.
    pub new_acl: MailboxAcl,
}

impl AclDiff {
    /// Creates a diff.
    #[must_use]
    pub fn new(old_acl: MailboxAcl, new_acl: MailboxAcl) -> Self {
        Self { old_acl, new_acl }
    }

    /// Whether the update changed anything.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.old_acl == self.new_acl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_rights_collapse() {
        assert_eq!(Rights::parse("aa").unwrap(), Rights::parse("a").unwrap());
    }

    #[test]
    fn test_rights_serialize_in_alphabet_order() {
        let rights = Rights::parse("xlar").unwrap();

        assert_eq!(rights.to_string(), "alrx");
    }

    #[test]
    fn test_contains_reports_granted_rights() {
        let rights = Rights::parse("lr").unwrap();

        assert!(rights.contains(Right::Lookup));
        assert!(rights.contains(Right::Read));
        assert!(!rights.contains(Right::Write));
        assert!(Right::ALL.iter().all(|right| !Rights::none().contains(*right)));
        assert_eq!(Rights::parse("").unwrap(), Rights::none());
    }

    #[test]
    fn test_unknown_right_is_reported() {
        assert_eq!(Rights::parse("az"), Err('z'));
    }

    #[test]
    fn test_parse_entry_keys() {
        let negative_group = EntryKey::parse("-$team").unwrap();
        assert!(negative_group.is_negative());
        assert_eq!(negative_group.name_type(), NameType::Group);
        assert_eq!(negative_group.name(), "team");
        assert_eq!(negative_group.to_string(), "-$team");

        let positive_user = EntryKey::parse("+bob").unwrap();
        assert!(!positive_user.is_negative());
        assert_eq!(positive_user.name_type(), NameType::User);
        assert_eq!(positive_user.to_string(), "bob");

        let special = EntryKey::parse("anyone").unwrap();
        assert_eq!(special.name_type(), NameType::Special);
    }

    #[test]
    fn test_parse_rejects_prefix_only_keys() {
        for raw in ["", "$", "-", "+", "-$", "+$"] {
            assert!(EntryKey::parse(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn test_user_entry_cannot_use_special_name() {
        assert!(EntryKey::user("owner").is_err());
        assert!(EntryKey::new("bob", NameType::Special, false).is_err());
    }

    #[test]
    fn test_with_entry_returns_new_acl() {
        let acl = MailboxAcl::owner_full_rights();

        let updated = acl.with_entry(EntryKey::user("bob").unwrap(), Rights::of([Right::Read]));

        assert_eq!(acl.len(), 1);
        assert_eq!(updated.len(), 2);
    }
}
