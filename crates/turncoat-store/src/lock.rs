//! Session-scoped advisory locks.
//!
//! Mutating handlers serialize per session by taking an advisory lock: an
//! atomic set-if-absent on a sentinel key, retried on a fixed interval up
//! to a bounded number of attempts. The winner holds a [`LockGuard`] that
//! deletes the sentinel on drop, so the lock releases on every exit path
//! including early `?` returns. Exhausting the retry budget is a loud
//! [`Error::LockTimeout`], never a silent skip.
//!
//! The lock is advisory. Invariants that must hold even against a caller
//! who skipped it (one in-flight round, one game per session) are enforced
//! by their own set-if-absent writes, not by this lock.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::{Error, KvStore, Result};

const LOCK_SENTINEL: &str = "1";

/// Retry policy for lock acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockConfig {
    /// Wait between failed attempts.
    pub retry_interval: Duration,
    /// Attempts before giving up.
    pub max_attempts: u32,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            retry_interval: Duration::from_millis(50),
            max_attempts: 100,
        }
    }
}

impl LockConfig {
    /// Set the wait between failed attempts.
    #[must_use]
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Set the number of attempts before giving up.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }
}

/// An advisory lock over one store key.
pub struct ScopedLock {
    store: Arc<dyn KvStore>,
    key: String,
    config: LockConfig,
}

impl ScopedLock {
    /// Lock over `key` with the default retry policy.
    pub fn new(store: Arc<dyn KvStore>, key: impl Into<String>) -> Self {
        Self::with_config(store, key, LockConfig::default())
    }

    /// Lock over `key` with a custom retry policy.
    pub fn with_config(
        store: Arc<dyn KvStore>,
        key: impl Into<String>,
        config: LockConfig,
    ) -> Self {
        Self {
            store,
            key: key.into(),
            config,
        }
    }

    /// Acquire the lock, waiting out the current holder if there is one.
    pub async fn acquire(&self) -> Result<LockGuard> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            if self.store.set_nx(&self.key, LOCK_SENTINEL)? {
                debug!(key = %self.key, attempts, "lock acquired");
                return Ok(LockGuard {
                    store: Arc::clone(&self.store),
                    key: self.key.clone(),
                });
            }
            if attempts >= self.config.max_attempts {
                warn!(key = %self.key, attempts, "lock retry budget exhausted");
                return Err(Error::LockTimeout {
                    key: self.key.clone(),
                    attempts,
                });
            }
            tokio::time::sleep(self.config.retry_interval).await;
        }
    }
}

/// Holds an acquired lock until dropped.
#[must_use = "the lock releases as soon as the guard drops"]
pub struct LockGuard {
    store: Arc<dyn KvStore>,
    key: String,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(error) = self.store.del(&self.key) {
            warn!(key = %self.key, %error, "failed to release lock");
        }
    }
}
