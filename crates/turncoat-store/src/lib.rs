//! Turncoat Storage Port
//!
//! Everything the game engine persists goes through the [`KvStore`]
//! trait: a flat key space where each key holds one scalar, set, list, or
//! hash. The trait matches the capability set of the remote key-value
//! engines the game was built to run against, so the engine's write
//! patterns (field-per-key records, set-if-absent commits) translate
//! one-to-one.
//!
//! Two things live alongside the port:
//! - [`MemoryStore`], the in-memory reference engine the suites test
//!   against;
//! - [`ScopedLock`], the advisory session lock built from the port's own
//!   set-if-absent primitive.
//!
//! # Atomicity
//!
//! Each trait method is independently atomic; there are no transactions
//! and no multi-key operations. Callers that need "all or nothing" across
//! several keys sequence their writes so that a retry after a partial
//! failure re-derives the same state.

mod error;
mod lock;
mod memory;

pub use error::{Error, Kind, Result};
pub use lock::{LockConfig, LockGuard, ScopedLock};
pub use memory::MemoryStore;

/// Capability contract for the engine's persistence.
///
/// Keys are flat strings. A key holds exactly one [`Kind`] of value;
/// using it as another kind is an [`Error::WrongKind`]. Absent keys read
/// as empty and come into being on first write. [`KvStore::set`] is the
/// one exception to the kind discipline: like the remote engines, it
/// replaces whatever the key held before.
pub trait KvStore: Send + Sync {
    /// Read a scalar. `None` if the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a scalar, replacing any existing value of any kind.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Write a scalar only if the key is absent (a value of any kind
    /// counts as present). Returns whether this call created it.
    fn set_nx(&self, key: &str, value: &str) -> Result<bool>;

    /// Remove a key of any kind. Returns whether it existed.
    fn del(&self, key: &str) -> Result<bool>;

    /// Add a member to a set. Returns whether it was newly added.
    fn set_add(&self, key: &str, member: &str) -> Result<bool>;

    /// All members of a set, order unspecified. Empty if absent.
    fn set_members(&self, key: &str) -> Result<Vec<String>>;

    /// Push a value onto the front of a list.
    fn list_push_front(&self, key: &str, value: &str) -> Result<()>;

    /// Push a value onto the back of a list.
    fn list_push_back(&self, key: &str, value: &str) -> Result<()>;

    /// Pop the front of a list. `None` if absent or empty.
    fn list_pop_front(&self, key: &str) -> Result<Option<String>>;

    /// Inclusive slice of a list. Negative indices count back from the
    /// end, so `(0, -1)` reads the whole list and `(0, 0)` peeks the
    /// front. Out-of-range bounds clamp; an inverted range is empty.
    fn list_range(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>>;

    /// Set one field of a hash. Returns whether the field was new.
    fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<bool>;

    /// All `(field, value)` pairs of a hash, order unspecified. Empty if
    /// absent.
    fn hash_get_all(&self, key: &str) -> Result<Vec<(String, String)>>;
}
