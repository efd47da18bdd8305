//! Quota roots and usage.

use std::collections::BTreeMap;
use std::fmt;

/// The entity a quota applies to. The empty root is valid.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuotaRoot(String);

impl QuotaRoot {
    /// Creates a quota root.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The serialized form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuotaRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Level at which a limit was defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QuotaScope {
    /// Server-wide default.
    Global,
    /// Per-domain setting.
    Domain,
    /// Per-user setting.
    User,
}

impl QuotaScope {
    /// Every scope, in serialization order.
    pub const ALL: [Self; 3] = [Self::Global, Self::Domain, Self::User];

    /// The serialized name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::Domain => "Domain",
            Self::User => "User",
        }
    }

    /// Looks a scope up by its serialized name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|scope| scope.name() == name)
    }
}

/// A quota limit, possibly unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuotaLimit {
    /// At most this many messages or bytes.
    Limited(u64),
    /// No limit.
    Unlimited,
}

impl QuotaLimit {
    /// Whether `used` exceeds this limit.
    #[must_use]
    pub fn is_exceeded_by(self, used: u64) -> bool {
        match self {
            Self::Limited(limit) => used > limit,
            Self::Unlimited => false,
        }
    }
}

/// Usage against a limit, for either message count or size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quota {
    used: u64,
    limit: QuotaLimit,
    limits: BTreeMap<QuotaScope, QuotaLimit>,
}

impl Quota {
    /// A quota with no per-scope breakdown.
    #[must_use]
    pub fn new(used: u64, limit: QuotaLimit) -> Self {
        Self {
            used,
            limit,
            limits: BTreeMap::new(),
        }
    }

    /// Returns a copy recording the limit defined at `scope`.
    #[must_use]
    pub fn with_scoped_limit(mut self, scope: QuotaScope, limit: QuotaLimit) -> Self {
        self.limits.insert(scope, limit);
        self
    }

    /// Current usage.
    #[must_use]
    pub fn used(&self) -> u64 {
        self.used
    }

    /// Effective limit.
    #[must_use]
    pub fn limit(&self) -> QuotaLimit {
        self.limit
    }

    /// Limits per scope, ordered by scope.
    pub fn scoped_limits(&self) -> impl Iterator<Item = (QuotaScope, QuotaLimit)> + '_ {
        self.limits.iter().map(|(scope, limit)| (*scope, *limit))
    }

    /// Whether usage exceeds the effective limit.
    #[must_use]
    pub fn is_over_quota(&self) -> bool {
        self.limit.is_exceeded_by(self.used)
    }
}
