//! Error kinds shared across the core crates.
//!
//! One enum covers every failure kind named in the specification's error
//! table so callers can match on *kind*, not just display text. Retries
//! (bounded, internal) are only ever attempted for [`Error::Network`] and
//! [`Error::RevisionConflict`]; every other variant propagates unchanged.

use crate::hash::Hash;

/// Crate-wide result alias.
pub type S5Result<T> = Result<T, Error>;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("path invalid: {0}")]
    PathInvalid(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("expected a file, found a directory at {0}")]
    IsDirectory(String),

    #[error("expected a directory, found a file at {0}")]
    IsFile(String),

    #[error("{0} is a reserved root and cannot be modified")]
    RootImmutable(String),

    #[error("directory {0} is not empty")]
    DirectoryNotEmpty(String),

    #[error("invalid cursor")]
    InvalidCursor,

    #[error("registry write lost the revision race after {attempts} attempts")]
    RevisionConflict { attempts: u32 },

    #[error("integrity check failed for {context}: expected {expected}, got {actual}")]
    IntegrityFailure {
        context: String,
        expected: Hash,
        actual: Hash,
    },

    #[error("crypto error: {0}")]
    Crypto(String),

    #[error("directory at {0} is encrypted but no key is available")]
    MissingEncryptionKey(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("operation timed out")]
    Timeout,

    #[error("operation cancelled")]
    Cancelled,

    #[error("invalid seed phrase: {0}")]
    InvalidSeedPhrase(String),
}

impl Error {
    /// Whether the core's internal bounded-retry loop applies to this kind.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Network(_) | Error::RevisionConflict { .. })
    }
}
