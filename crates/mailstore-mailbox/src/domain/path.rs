//! Mailbox paths.

use std::fmt;

use super::user::Username;

/// Fully qualified mailbox location: namespace, owner and name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MailboxPath {
    namespace: Option<String>,
    user: Option<Username>,
    name: String,
}

impl MailboxPath {
    /// Namespace of the mailboxes a user owns.
    pub const PRIVATE_NAMESPACE: &'static str = "#private";

    /// Creates a path from all of its components.
    #[must_use]
    pub fn new(namespace: Option<String>, user: Option<Username>, name: impl Into<String>) -> Self {
        Self {
            namespace,
            user,
            name: name.into(),
        }
    }

    /// A mailbox in `user`'s private namespace.
    #[must_use]
    pub fn for_user(user: Username, name: impl Into<String>) -> Self {
        Self::new(Some(Self::PRIVATE_NAMESPACE.to_owned()), Some(user), name)
    }

    /// The namespace, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// The owning user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&Username> {
        self.user.as_ref()
    }

    /// The mailbox name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the mailbox lives in `user`'s private namespace.
    #[must_use]
    pub fn belongs_to(&self, user: &Username) -> bool {
        self.namespace() == Some(Self::PRIVATE_NAMESPACE) && self.user.as_ref() == Some(user)
    }
}

impl fmt::Display for MailboxPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.namespace.as_deref().unwrap_or(""),
            self.user.as_ref().map(Username::as_string).unwrap_or_default(),
            self.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_user_uses_private_namespace() {
        let bob = Username::of("bob@domain.tld").unwrap();

        let path = MailboxPath::for_user(bob.clone(), "INBOX");

        assert_eq!(path.namespace(), Some("#private"));
        assert!(path.belongs_to(&bob));
        assert_eq!(path.to_string(), "#private:bob@domain.tld:INBOX");
    }
}
