//! Environment configuration.

use std::path::PathBuf;

use mailstore_mailbox::codec::MailboxEventCodec;
use mailstore_mailbox::domain::ids::{NumericIdFactory, UuidIdFactory};

use crate::error::AppError;

/// Variable selecting the identifier format of the log.
pub const ID_FACTORY_VAR: &str = "MAILSTORE_ID_FACTORY";
/// Variable naming the input file; stdin when unset.
pub const INPUT_VAR: &str = "MAILSTORE_INPUT";

/// Identifier format used by the backend that wrote the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdFormat {
    /// Canonical hyphenated UUIDs.
    #[default]
    Uuid,
    /// Decimal 64-bit counters.
    Numeric,
}

impl IdFormat {
    /// Builds a codec validating identifiers of this format.
    #[must_use]
    pub fn codec(self) -> MailboxEventCodec {
        match self {
            Self::Uuid => MailboxEventCodec::with_factory(UuidIdFactory),
            Self::Numeric => MailboxEventCodec::with_factory(NumericIdFactory::default()),
        }
    }
}

/// Settings of one import run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    /// Identifier format of the log.
    pub id_format: IdFormat,
    /// File to read, or `None` for stdin.
    pub input: Option<PathBuf>,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable holds an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable holds an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let id_format = match lookup(ID_FACTORY_VAR).as_deref() {
            None | Some("uuid") => IdFormat::Uuid,
            Some("numeric") => IdFormat::Numeric,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "{ID_FACTORY_VAR} must be `uuid` or `numeric`, got {other:?}"
                )));
            }
        };
        let input = match lookup(INPUT_VAR) {
            Some(path) if path.trim().is_empty() => {
                return Err(AppError::Config(format!("{INPUT_VAR} must not be blank")));
            }
            path => path.map(PathBuf::from),
        };
        Ok(Self { id_format, input })
    }
}
