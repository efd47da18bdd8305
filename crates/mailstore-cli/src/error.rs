//! Import command error types.

use mailstore_core::error::{DecodeError, DomainError};
use thiserror::Error;

/// Startup and runtime errors of the import command.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable holds an invalid value.
    #[error("configuration error: {0}")]
    Config(String),

    /// The input could not be read.
    #[error("input error: {0}")]
    Io(#[from] std::io::Error),

    /// A line is not a valid event document.
    #[error("line {line}: {source}")]
    Decode {
        /// 1-based line number.
        line: usize,
        /// Why the document was rejected.
        source: DecodeError,
    },

    /// The store refused an event.
    #[error("line {line}: {source}")]
    Rejected {
        /// 1-based line number.
        line: usize,
        /// Why the append failed.
        source: DomainError,
    },

    /// The store could not be read back.
    #[error("store error: {0}")]
    Store(#[from] DomainError),
}
