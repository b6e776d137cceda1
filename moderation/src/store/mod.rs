//! Warning count persistence
//!
//! The engine never owns storage. It talks to a [`WarningStore`], which maps a
//! user id to a non-negative count held as decimal text in a key-value
//! backend (see [`schema`]).
//!
//! # Backends
//!
//! - [`InMemoryWarningStore`]: process-local, for tests and embedding
//! - [`FileWarningStore`]: a JSON document, fsynced on every write
//! - `RocksWarningStore`: RocksDB column family (feature `rocksdb`)
//!
//! # Concurrency
//!
//! A plain get-then-set loses updates when two moderators act on the same
//! user at once. Counter changes go through [`update_count`], which retries
//! a compare-and-swap until it lands.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::identity::UserId;

pub mod file;
pub mod memory;
#[cfg(feature = "rocksdb")]
pub mod rocks;
pub mod schema;

pub use file::FileWarningStore;
pub use memory::InMemoryWarningStore;
#[cfg(feature = "rocksdb")]
pub use rocks::RocksWarningStore;

/// Attempts [`update_count`] makes before reporting contention.
pub const CAS_MAX_ATTEMPTS: u32 = 16;

/// Error type for warning store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("warning store unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("stored value for {key} is not a count: {value:?}")]
    Corrupt { key: String, value: String },

    #[error("gave up on {key} after {attempts} conflicting updates")]
    Contention { key: String, attempts: u32 },

    #[error("Lock poisoned")]
    LockPoisoned,
}

/// Result type for warning store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Shared reference to a warning store
pub type SharedWarningStore = Arc<dyn WarningStore>;

/// Key-value boundary for per-user warning counts.
///
/// Implementations must make `set` and a successful `compare_and_swap`
/// durable before returning.
#[async_trait]
pub trait WarningStore: Send + Sync {
    /// Current count; 0 when the user has no record.
    async fn get(&self, user: &UserId) -> StoreResult<u32>;

    /// Unconditional overwrite.
    async fn set(&self, user: &UserId, count: u32) -> StoreResult<()>;

    /// Write `new` only if the stored count still equals `expected`.
    ///
    /// A missing record matches `expected == 0`. Returns whether the write
    /// happened.
    async fn compare_and_swap(&self, user: &UserId, expected: u32, new: u32) -> StoreResult<bool>;
}

/// Before/after counts from [`update_count`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountUpdate {
    pub prior: u32,
    pub current: u32,
}

impl CountUpdate {
    pub fn changed(&self) -> bool {
        self.prior != self.current
    }
}

/// Atomically replace a user's count with `f(prior)`.
///
/// Reads, computes, and compare-and-swaps, re-reading on conflict. `f` must
/// be pure: it may run more than once. When `f(prior) == prior` nothing is
/// written.
pub async fn update_count<S, F>(store: &S, user: &UserId, f: F) -> StoreResult<CountUpdate>
where
    S: WarningStore + ?Sized,
    F: Fn(u32) -> u32 + Send + Sync,
{
    for attempt in 1..=CAS_MAX_ATTEMPTS {
        let prior = store.get(user).await?;
        let current = f(prior);
        if current == prior {
            return Ok(CountUpdate { prior, current });
        }
        if store.compare_and_swap(user, prior, current).await? {
            return Ok(CountUpdate { prior, current });
        }
        debug!(user = %user, attempt, prior, "warning count changed underneath; retrying");
    }
    Err(StoreError::Contention {
        key: schema::key(user),
        attempts: CAS_MAX_ATTEMPTS,
    })
}

/// Fetch a user's record.
pub async fn record<S>(store: &S, user: &UserId) -> StoreResult<crate::identity::WarningRecord>
where
    S: WarningStore + ?Sized,
{
    Ok(crate::identity::WarningRecord {
        user: user.clone(),
        count: store.get(user).await?,
    })
}
