//! Message flags.

use std::collections::BTreeSet;

use mailstore_core::error::DomainError;

/// Flags defined by IMAP itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SystemFlag {
    /// `\Answered`
    Answered,
    /// `\Deleted`
    Deleted,
    /// `\Draft`
    Draft,
    /// `\Flagged`
    Flagged,
    /// `\Recent`
    Recent,
    /// `\Seen`
    Seen,
}

impl SystemFlag {
    /// Every system flag, in serialization order.
    pub const ALL: [Self; 6] = [
        Self::Answered,
        Self::Deleted,
        Self::Draft,
        Self::Flagged,
        Self::Recent,
        Self::Seen,
    ];

    /// The serialized name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Answered => "Answered",
            Self::Deleted => "Deleted",
            Self::Draft => "Draft",
            Self::Flagged => "Flagged",
            Self::Recent => "Recent",
            Self::Seen => "Seen",
        }
    }

    /// Looks a flag up by its serialized name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.name() == name)
    }
}

/// An immutable set of system and user flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Flags {
    system: BTreeSet<SystemFlag>,
    user: BTreeSet<String>,
}

impl Flags {
    /// No flag set.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a flag set.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` if a user flag is empty.
    pub fn new<U>(
        system: impl IntoIterator<Item = SystemFlag>,
        user: impl IntoIterator<Item = U>,
    ) -> Result<Self, DomainError>
    where
        U: Into<String>,
    {
        let user = user
            .into_iter()
            .map(Into::into)
            .map(|flag: String| {
                if flag.is_empty() {
                    Err(DomainError::InvalidArgument("user flag must not be empty".into()))
                } else {
                    Ok(flag)
                }
            })
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self {
            system: system.into_iter().collect(),
            user,
        })
    }

    /// Only system flags.
    #[must_use]
    pub fn of_system(system: impl IntoIterator<Item = SystemFlag>) -> Self {
        Self {
            system: system.into_iter().collect(),
            user: BTreeSet::new(),
        }
    }

    /// System flags in serialization order.
    pub fn system_flags(&self) -> impl Iterator<Item = SystemFlag> + '_ {
        self.system.iter().copied()
    }

    /// User flags, sorted.
    pub fn user_flags(&self) -> impl Iterator<Item = &str> {
        self.user.iter().map(String::as_str)
    }

    /// Whether `flag` is set.
    #[must_use]
    pub fn contains(&self, flag: SystemFlag) -> bool {
        self.system.contains(&flag)
    }

    /// Whether the user flag `flag` is set.
    #[must_use]
    pub fn contains_user_flag(&self, flag: &str) -> bool {
        self.user.contains(flag)
    }

    /// Whether no flag is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.system.is_empty() && self.user.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for flag in SystemFlag::ALL {
            assert_eq!(SystemFlag::from_name(flag.name()), Some(flag));
        }
        assert_eq!(SystemFlag::from_name("seen"), None);
    }

    #[test]
    fn test_new_rejects_empty_user_flag() {
        let result = Flags::new([SystemFlag::Seen], [""]);

        assert!(result.is_err());
    }

    #[test]
    fn test_system_flags_are_ordered() {
        let flags = Flags::of_system([SystemFlag::Seen, SystemFlag::Answered]);

        let names: Vec<&str> = flags.system_flags().map(SystemFlag::name).collect();

        assert_eq!(names, vec!["Answered", "Seen"]);
        assert!(flags.contains(SystemFlag::Seen));
    }

    #[test]
    fn test_contains_user_flag() {
        let flags = Flags::new([SystemFlag::Seen], ["custom"]).unwrap();

        assert!(flags.contains_user_flag("custom"));
        assert!(!flags.contains_user_flag("Seen"));
    }
}
