//! Device-local key-value namespace the stores persist into.

use crate::config::CorruptPolicy;
use crate::errors::{StoreError, StoreResult};
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::{fs, sync::Mutex};
use tracing::{debug, error};

/// String payloads addressed by key. Implementations only move bytes; encoding
/// and corruption handling belong to the stores.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> std::io::Result<Option<String>>;

    async fn set(&self, key: &str, value: String) -> std::io::Result<()>;

    async fn remove(&self, key: &str) -> std::io::Result<()>;
}

/// One `<key>.json` file per key inside a data directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub async fn open(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> std::io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn set(&self, key: &str, value: String) -> std::io::Result<()> {
        let path = self.path_for(key);
        debug!("writing {} bytes to {}", value.len(), path.display());
        fs::write(path, value).await
    }

    async fn remove(&self, key: &str) -> std::io::Result<()> {
        match fs::remove_file(self.path_for(key)).await {
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> std::io::Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> std::io::Result<()> {
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> std::io::Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

/// Decodes a stored payload, applying `policy` when it is malformed.
pub(crate) fn decode_payload<T>(key: &str, payload: &str, policy: CorruptPolicy) -> StoreResult<T>
where
    T: DeserializeOwned + Default,
{
    match serde_json::from_str(payload) {
        Ok(value) => Ok(value),
        Err(source) => match policy {
            CorruptPolicy::UseDefault => {
                error!("failed to parse '{key}', falling back to defaults: {source}");
                Ok(T::default())
            }
            CorruptPolicy::Fail => Err(StoreError::Corrupt {
                key: key.to_string(),
                source,
            }),
        },
    }
}

pub(crate) fn encode_payload<T: Serialize + ?Sized>(value: &T) -> StoreResult<String> {
    serde_json::to_string(value).map_err(StoreError::Encode)
}

/// Reads succeed with nothing stored, writes always fail.
#[cfg(test)]
pub struct FailingStore;

#[cfg(test)]
#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> std::io::Result<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String) -> std::io::Result<()> {
        Err(std::io::Error::other("storage quota exceeded"))
    }

    async fn remove(&self, _key: &str) -> std::io::Result<()> {
        Err(std::io::Error::other("storage quota exceeded"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_dir() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("potty_log_kv_{}_{}", std::process::id(), nanos));
        path
    }

    #[tokio::test]
    async fn file_store_reads_back_writes_and_removes() {
        let store = FileStore::open(unique_dir()).await.unwrap();
        assert_eq!(store.get("poop_records").await.unwrap(), None);

        store.set("poop_records", "[]".to_string()).await.unwrap();
        assert!(store.dir().join("poop_records.json").exists());
        assert_eq!(store.get("poop_records").await.unwrap().as_deref(), Some("[]"));

        store.remove("poop_records").await.unwrap();
        assert_eq!(store.get("poop_records").await.unwrap(), None);
        store.remove("poop_records").await.unwrap();

        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[test]
    fn decode_payload_honours_corrupt_policy() {
        let parsed: Vec<u32> = decode_payload("k", "[1,2]", CorruptPolicy::Fail).unwrap();
        assert_eq!(parsed, vec![1, 2]);

        let fallback: Vec<u32> = decode_payload("k", "{oops", CorruptPolicy::UseDefault).unwrap();
        assert!(fallback.is_empty());

        let err = decode_payload::<Vec<u32>>("k", "{oops", CorruptPolicy::Fail).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { ref key, .. } if key == "k"));
    }

    #[tokio::test]
    async fn memory_store_keeps_keys_apart() {
        let store = MemoryStore::new();
        store.set("a", "1".to_string()).await.unwrap();
        store.set("b", "2".to_string()).await.unwrap();
        store.remove("a").await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), None);
        assert_eq!(store.get("b").await.unwrap().as_deref(), Some("2"));
    }
}
