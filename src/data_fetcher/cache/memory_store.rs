//! Bounded in-process object store with LRU eviction

use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use super::store::{ObjectMetadata, ObjectStore, StoredObject};
use crate::constants::store::MEMORY_STORE_CAPACITY;
use crate::error::AppError;

/// In-memory stand-in for a KV backend such as Redis.
///
/// Optionally enforces a per-value size ceiling, which is what the chunked
/// layout exists for.
#[derive(Debug)]
pub struct MemoryStore {
    entries: RwLock<LruCache<String, StoredObject>>,
    max_value_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_capacity(MEMORY_STORE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
            max_value_bytes: None,
        }
    }

    pub fn with_max_value_bytes(mut self, limit: usize) -> Self {
        self.max_value_bytes = Some(limit);
        self
    }

    /// All keys currently held, sorted
    pub async fn keys(&self) -> Vec<String> {
        let entries = self.entries.read().await;
        let mut keys: Vec<String> = entries.iter().map(|(k, _)| k.clone()).collect();
        keys.sort();
        keys
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn capacity(&self) -> usize {
        self.entries.read().await.cap().get()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn max_value_bytes(&self) -> Option<usize> {
        self.max_value_bytes
    }

    async fn set(
        &self,
        key: &str,
        data: String,
        metadata: ObjectMetadata,
    ) -> Result<(), AppError> {
        if let Some(limit) = self.max_value_bytes
            && data.len() > limit
        {
            return Err(AppError::store_value_too_large(key, data.len(), limit));
        }

        trace!(key, bytes = data.len(), "memory store set");
        let mut entries = self.entries.write().await;
        if let Some((evicted, _)) = entries.push(key.to_string(), StoredObject { data, metadata })
            && evicted != key
        {
            debug!(evicted = %evicted, "memory store evicted least recently used entry");
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>, AppError> {
        // LRU bookkeeping needs the write lock even for reads
        let mut entries = self.entries.write().await;
        Ok(entries.get(key).cloned())
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        Ok(self.entries.read().await.contains(key))
    }

    async fn delete(&self, key: &str) -> Result<bool, AppError> {
        Ok(self.entries.write().await.pop(key).is_some())
    }
}
