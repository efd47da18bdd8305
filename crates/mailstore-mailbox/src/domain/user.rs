//! Usernames.

use std::fmt;

use mailstore_core::error::DomainError;

/// A user, either `local` or `local@domain`.
///
/// The domain part is stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Username {
    local: String,
    domain: Option<String>,
}

impl Username {
    /// Parses a username.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` if `raw` is empty, holds more
    /// than one `@`, or has an empty local or domain part.
    pub fn of(raw: &str) -> Result<Self, DomainError> {
        if raw.is_empty() {
            return Err(DomainError::InvalidArgument("username must not be empty".into()));
        }
        match raw.split_once('@') {
            None => Ok(Self {
                local: raw.to_owned(),
                domain: None,
            }),
            Some((local, domain)) => {
                if domain.contains('@') {
                    return Err(DomainError::InvalidArgument(format!(
                        "username {raw:?} holds more than one '@'"
                    )));
                }
                if local.is_empty() || domain.is_empty() {
                    return Err(DomainError::InvalidArgument(format!(
                        "username {raw:?} has an empty local or domain part"
                    )));
                }
                Ok(Self {
                    local: local.to_owned(),
                    domain: Some(domain.to_lowercase()),
                })
            }
        }
    }

    /// The part before `@`.
    #[must_use]
    pub fn local_part(&self) -> &str {
        &self.local
    }

    /// The part after `@`, if any.
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// The serialized form.
    #[must_use]
    pub fn as_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.domain {
            Some(domain) => write!(f, "{}@{domain}", self.local),
            None => f.write_str(&self.local),
        }
    }
}
