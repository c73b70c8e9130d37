//! Error types for turncoat-store.

use thiserror::Error;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The four value kinds a key can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Scalar,
    Set,
    List,
    Hash,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar => write!(f, "scalar"),
            Self::Set => write!(f, "set"),
            Self::List => write!(f, "list"),
            Self::Hash => write!(f, "hash"),
        }
    }
}

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A key was used at a kind other than the one it holds.
    #[error("key {key:?} holds a {actual}, not a {expected}")]
    WrongKind {
        key: String,
        expected: Kind,
        actual: Kind,
    },

    /// An advisory lock was not acquired within its retry budget.
    #[error("lock {key:?} still held after {attempts} attempts")]
    LockTimeout { key: String, attempts: u32 },
}
