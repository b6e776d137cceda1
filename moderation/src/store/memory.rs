//! Process-local warning store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{schema, StoreError, StoreResult, WarningStore};
use crate::identity::UserId;

/// In-memory store holding the same key/value text a real backend would.
#[derive(Debug, Default)]
pub struct InMemoryWarningStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryWarningStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including those at 0.
    pub fn len(&self) -> StoreResult<usize> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Raw stored text for a user, as the backend would hold it.
    pub fn raw(&self, user: &UserId) -> StoreResult<Option<String>> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.get(&schema::key(user)).cloned())
    }
}

#[async_trait]
impl WarningStore for InMemoryWarningStore {
    async fn get(&self, user: &UserId) -> StoreResult<u32> {
        let key = schema::key(user);
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        schema::decode(&key, entries.get(&key).map(String::as_str))
    }

    async fn set(&self, user: &UserId, count: u32) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        entries.insert(schema::key(user), schema::encode(count));
        Ok(())
    }

    async fn compare_and_swap(&self, user: &UserId, expected: u32, new: u32) -> StoreResult<bool> {
        let key = schema::key(user);
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        let current = schema::decode(&key, entries.get(&key).map(String::as_str))?;
        if current != expected {
            return Ok(false);
        }
        entries.insert(key, schema::encode(new));
        Ok(true)
    }
}
