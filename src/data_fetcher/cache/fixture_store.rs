//! Typed access to fixture entries on top of a raw [`ObjectStore`].
//!
//! Hides whether an entry is one record or a chunk set, and validates every
//! record against the key it was read from.

use std::sync::Arc;
use tracing::{debug, warn};

use super::chunked;
use super::partition::{EntryId, Partition};
use super::store::{ObjectMetadata, ObjectStore};
use super::types::{CacheEntry, StoredRecord};
use crate::constants::chunking::DEFAULT_CHUNK_SIZE;
use crate::data_fetcher::models::Fixture;
use crate::error::AppError;

/// How fixture lists are laid out in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One record per entry
    Single,
    /// Meta record plus fixed-size chunks
    Chunked { chunk_size: usize },
}

#[derive(Debug, Clone)]
pub struct FixtureStore {
    store: Arc<dyn ObjectStore>,
    layout: Layout,
}

impl FixtureStore {
    pub fn new(store: Arc<dyn ObjectStore>, layout: Layout) -> Self {
        let layout = match layout {
            Layout::Chunked { chunk_size: 0 } => Layout::Chunked {
                chunk_size: DEFAULT_CHUNK_SIZE,
            },
            other => other,
        };
        Self { store, layout }
    }

    /// Chunked layout for backends with a value ceiling, single otherwise
    pub fn for_backend(store: Arc<dyn ObjectStore>, chunk_size: usize) -> Self {
        let layout = if store.max_value_bytes().is_some() {
            Layout::Chunked { chunk_size }
        } else {
            Layout::Single
        };
        Self::new(store, layout)
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn backend(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    /// Reads the entry for `id` from `partition`.
    ///
    /// A record that does not describe `id` is an anomaly and reads as a miss.
    pub async fn read(
        &self,
        id: EntryId,
        partition: Partition,
    ) -> Result<Option<CacheEntry>, AppError> {
        let key = id.key_in(partition);
        let found = match self.layout {
            Layout::Single => self.read_single(&key, id).await?,
            Layout::Chunked { .. } => chunked::read_chunked(self.store.as_ref(), &key, id).await?,
        };

        Ok(found.map(|(fixtures, metadata)| CacheEntry {
            partition,
            key,
            date: id.date,
            is_live: id.is_live,
            fixtures,
            metadata,
        }))
    }

    async fn read_single(
        &self,
        key: &str,
        id: EntryId,
    ) -> Result<Option<(Vec<Fixture>, ObjectMetadata)>, AppError> {
        let Some(object) = self.store.get(key).await? else {
            return Ok(None);
        };
        let record: StoredRecord = serde_json::from_str(&object.data)
            .map_err(|e| AppError::store_read(key, format!("corrupt record: {e}")))?;
        match record {
            StoredRecord::Fixtures {
                date,
                is_live,
                fixtures,
            } if date == id.date && is_live == id.is_live => Ok(Some((fixtures, object.metadata))),
            _ => {
                warn!(key, entry = %id, "stored record does not match its key, treating as miss");
                Ok(None)
            }
        }
    }

    /// Writes the entry for `id` into `partition`, replacing what was there
    pub async fn write(
        &self,
        id: EntryId,
        partition: Partition,
        fixtures: &[Fixture],
        metadata: ObjectMetadata,
    ) -> Result<(), AppError> {
        let key = id.key_in(partition);
        match self.layout {
            Layout::Single => {
                let record = StoredRecord::Fixtures {
                    date: id.date,
                    is_live: id.is_live,
                    fixtures: fixtures.to_vec(),
                };
                let data = serde_json::to_string(&record)
                    .map_err(|e| AppError::store_write(&key, e.to_string()))?;
                self.store.set(&key, data, metadata).await
            }
            Layout::Chunked { chunk_size } => {
                chunked::write_chunked(
                    self.store.as_ref(),
                    &key,
                    id,
                    fixtures,
                    chunk_size,
                    metadata,
                )
                .await?;
                Ok(())
            }
        }
    }

    /// Whether anything resolves for `id` in `partition`
    pub async fn exists(&self, id: EntryId, partition: Partition) -> Result<bool, AppError> {
        let key = id.key_in(partition);
        match self.layout {
            Layout::Single => self.store.exists(&key).await,
            Layout::Chunked { .. } => chunked::chunked_exists(self.store.as_ref(), &key).await,
        }
    }

    /// Deletes the entry for `id` in `partition`. Returns whether anything was removed.
    pub async fn remove(&self, id: EntryId, partition: Partition) -> Result<bool, AppError> {
        let key = id.key_in(partition);
        match self.layout {
            Layout::Single => self.store.delete(&key).await,
            Layout::Chunked { .. } => chunked::delete_chunked(self.store.as_ref(), &key, id).await,
        }
    }

    /// Moves the entry for `id` from one partition to another.
    ///
    /// Put-then-delete with no atomicity: on failure the entry may sit in
    /// both partitions or, for a broken chunk set, in neither. Returns
    /// `Ok(false)` when there was nothing readable to move. Callers verify
    /// the outcome with [`FixtureStore::exists`].
    pub async fn relocate(
        &self,
        id: EntryId,
        from: Partition,
        to: Partition,
    ) -> Result<bool, AppError> {
        let from_key = id.key_in(from);
        let to_key = id.key_in(to);
        match self.layout {
            Layout::Single => self.store.move_object(&from_key, &to_key).await,
            Layout::Chunked { chunk_size } => {
                let store = self.store.as_ref();
                let Some((fixtures, metadata)) =
                    chunked::read_chunked(store, &from_key, id).await?
                else {
                    // An unreadable set at the source is garbage; clear it
                    if chunked::delete_chunked(store, &from_key, id).await? {
                        debug!(key = %from_key, "removed incomplete chunk set instead of moving it");
                    }
                    return Ok(false);
                };
                chunked::write_chunked(store, &to_key, id, &fixtures, chunk_size, metadata)
                    .await
                    .map_err(|e| AppError::store_move(&from_key, &to_key, e.to_string()))?;
                chunked::delete_chunked(store, &from_key, id)
                    .await
                    .map_err(|e| AppError::store_move(&from_key, &to_key, e.to_string()))?;
                Ok(true)
            }
        }
    }
}
