//! JSON-file warning store
//!
//! The whole key/value map lives in one JSON object. Every write goes to a
//! sibling temp file, is fsynced, and is renamed over the original, so a
//! reader sees either the old or the new document and a completed `set`
//! survives a restart. Writers within the process are serialized.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::{schema, StoreError, StoreResult, WarningStore};
use crate::identity::{UserId, WarningRecord};

type Entries = BTreeMap<String, String>;

/// Durable store backed by a single JSON file.
#[derive(Debug)]
pub struct FileWarningStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileWarningStore {
    /// Open a store at `path`. The file is created on first write.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Get the backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored records, ordered by user id.
    pub async fn records(&self) -> StoreResult<Vec<WarningRecord>> {
        let entries = self.load().await?;
        entries
            .iter()
            .filter_map(|(key, value)| {
                schema::parse_key(key).map(|user| {
                    schema::decode(key, Some(value)).map(|count| WarningRecord { user, count })
                })
            })
            .collect()
    }

    async fn load(&self) -> StoreResult<Entries> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Entries::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                StoreError::Serialization(format!("{}: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn persist(&self, entries: &Entries) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(entries)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl WarningStore for FileWarningStore {
    async fn get(&self, user: &UserId) -> StoreResult<u32> {
        let key = schema::key(user);
        let entries = self.load().await?;
        schema::decode(&key, entries.get(&key).map(String::as_str))
    }

    async fn set(&self, user: &UserId, count: u32) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(schema::key(user), schema::encode(count));
        self.persist(&entries).await
    }

    async fn compare_and_swap(&self, user: &UserId, expected: u32, new: u32) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().await;
        let key = schema::key(user);
        let mut entries = self.load().await?;
        let current = schema::decode(&key, entries.get(&key).map(String::as_str))?;
        if current != expected {
            return Ok(false);
        }
        entries.insert(key, schema::encode(new));
        self.persist(&entries).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_store() -> (FileWarningStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = FileWarningStore::open(dir.path().join("warnings.json")).unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn test_missing_file_reads_zero() {
        let (store, _dir) = test_store();
        assert_eq!(store.get(&UserId::new("t2_a")).await.unwrap(), 0);
        assert!(store.records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let (store, dir) = test_store();
        let user = UserId::new("t2_a");
        store.set(&user, 2).await.unwrap();

        let reopened = FileWarningStore::open(dir.path().join("warnings.json")).unwrap();
        assert_eq!(reopened.get(&user).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_on_disk_format() {
        let (store, _dir) = test_store();
        store.set(&UserId::new("t2_a"), 3).await.unwrap();
        let text = std::fs::read_to_string(store.path()).unwrap();
        let parsed: BTreeMap<String, String> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.get("t2_a_warnings").map(String::as_str), Some("3"));
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_compare_and_swap() {
        let (store, _dir) = test_store();
        let user = UserId::new("t2_a");
        assert!(store.compare_and_swap(&user, 0, 1).await.unwrap());
        assert!(!store.compare_and_swap(&user, 0, 2).await.unwrap());
        assert_eq!(store.get(&user).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_records_sorted() {
        let (store, _dir) = test_store();
        store.set(&UserId::new("t2_b"), 1).await.unwrap();
        store.set(&UserId::new("t2_a"), 2).await.unwrap();
        let records = store.records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].user, UserId::new("t2_a"));
        assert_eq!(records[0].count, 2);
    }

    #[tokio::test]
    async fn test_corrupt_file_reported() {
        let (store, _dir) = test_store();
        std::fs::write(store.path(), "not json").unwrap();
        let err = store.get(&UserId::new("t2_a")).await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
