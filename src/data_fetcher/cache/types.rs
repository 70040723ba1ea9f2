//! Records persisted in the object store and the entry handed to callers

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::partition::{EntryId, Partition};
use super::store::ObjectMetadata;
use crate::data_fetcher::models::Fixture;

/// Every value the engine writes is one of these, tagged by `kind`, and is
/// checked against the key it was read from before being trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoredRecord {
    Fixtures {
        date: NaiveDate,
        #[serde(rename = "isLive")]
        is_live: bool,
        fixtures: Vec<Fixture>,
    },
    ChunkMeta(ChunkMeta),
    Chunk {
        index: usize,
        generation: u64,
        fixtures: Vec<Fixture>,
    },
}

/// Header of a chunked fixture list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMeta {
    pub total: usize,
    pub chunk_count: usize,
    pub date: NaiveDate,
    pub is_live: bool,
    /// Random tag shared by the meta and every chunk of one write. Chunks
    /// carrying another tag belong to a different write.
    pub generation: u64,
}

impl ChunkMeta {
    pub fn describes(&self, id: EntryId) -> bool {
        self.date == id.date && self.is_live == id.is_live
    }
}

/// A fixture list read back from the store
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub partition: Partition,
    pub key: String,
    pub date: NaiveDate,
    pub is_live: bool,
    pub fixtures: Vec<Fixture>,
    pub metadata: ObjectMetadata,
}

impl CacheEntry {
    pub fn id(&self) -> EntryId {
        EntryId::new(self.date, self.is_live)
    }
}
