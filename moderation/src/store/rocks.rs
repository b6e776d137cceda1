//! RocksDB-backed warning store
//!
//! Counts live in the [`schema::CF_WARNINGS`] column family as decimal text.
//! RocksDB has no native compare-and-swap, so conditional writes are
//! serialized by an in-process mutex; a single process owns the database.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, Options, WriteOptions, DB};

use super::{schema, StoreError, StoreResult, WarningStore};
use crate::identity::UserId;

/// RocksDB-backed persistent warning store
pub struct RocksWarningStore {
    db: Arc<DB>,
    cas_lock: Mutex<()>,
    path: PathBuf,
}

impl RocksWarningStore {
    /// Open or create a store at the given path
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf = ColumnFamilyDescriptor::new(schema::CF_WARNINGS, Options::default());
        let db = DB::open_cf_descriptors(&opts, &path, vec![cf])?;

        Ok(Self {
            db: Arc::new(db),
            cas_lock: Mutex::new(()),
            path,
        })
    }

    /// Get the database path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn read(&self, key: &str) -> StoreResult<u32> {
        let cf = self
            .db
            .cf_handle(schema::CF_WARNINGS)
            .ok_or_else(|| StoreError::Unavailable("missing warnings column family".into()))?;
        let value = self.db.get_cf(&cf, key.as_bytes())?;
        let text = value
            .map(|bytes| String::from_utf8(bytes).map_err(|e| StoreError::Serialization(e.to_string())))
            .transpose()?;
        schema::decode(key, text.as_deref())
    }

    fn write(&self, key: &str, count: u32) -> StoreResult<()> {
        let cf = self
            .db
            .cf_handle(schema::CF_WARNINGS)
            .ok_or_else(|| StoreError::Unavailable("missing warnings column family".into()))?;
        let mut opts = WriteOptions::default();
        opts.set_sync(true);
        self.db
            .put_cf_opt(&cf, key.as_bytes(), schema::encode(count).as_bytes(), &opts)?;
        Ok(())
    }
}

#[async_trait]
impl WarningStore for RocksWarningStore {
    async fn get(&self, user: &UserId) -> StoreResult<u32> {
        self.read(&schema::key(user))
    }

    async fn set(&self, user: &UserId, count: u32) -> StoreResult<()> {
        let _guard = self.cas_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        self.write(&schema::key(user), count)
    }

    async fn compare_and_swap(&self, user: &UserId, expected: u32, new: u32) -> StoreResult<bool> {
        let key = schema::key(user);
        let _guard = self.cas_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        if self.read(&key)? != expected {
            return Ok(false);
        }
        self.write(&key, new)?;
        Ok(true)
    }
}
