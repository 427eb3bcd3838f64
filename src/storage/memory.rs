//! In-memory object store used by tests and offline development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{ObjectStore, StorageError};

/// HashMap-backed store with `memory://` retrieval URLs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a stored object's bytes, if present.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn download_url(&self, key: &str) -> Result<String, StorageError> {
        let objects = self.objects.lock().unwrap();
        if objects.contains_key(key) {
            Ok(format!("memory://{key}"))
        } else {
            Err(StorageError::NotFound(key.to_string()))
        }
    }

    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        Ok(format!("memory://{key}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_lookup() {
        let store = MemoryStore::new();

        assert!(matches!(
            store.download_url("audio/missing.mp3").await,
            Err(StorageError::NotFound(_))
        ));

        let url = store
            .put("audio/a.mp3", vec![1, 2, 3], "audio/mpeg")
            .await
            .unwrap();
        assert_eq!(url, "memory://audio/a.mp3");
        assert_eq!(store.download_url("audio/a.mp3").await.unwrap(), url);
        assert_eq!(store.get("audio/a.mp3").unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_distinct_keys_are_distinct_objects() {
        let store = MemoryStore::new();
        store.put("audio/a.mp3", vec![1], "audio/mpeg").await.unwrap();
        store.put("audio/b.mp3", vec![2], "audio/mpeg").await.unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("audio/a.mp3").unwrap(), vec![1]);
        assert_eq!(store.get("audio/b.mp3").unwrap(), vec![2]);
    }
}
