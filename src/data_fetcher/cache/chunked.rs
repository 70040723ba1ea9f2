//! Chunked payload codec.
//!
//! Backends with a per-value size ceiling get fixture lists split across a
//! meta record and `chunk_count` chunk records. A set is only readable when
//! the meta and every chunk it names are present; anything less is a miss.

use futures::future::try_join_all;
use rand::Rng;
use tracing::{debug, instrument, warn};

use super::partition::{EntryId, chunk_key, chunk_meta_key};
use super::store::{ObjectMetadata, ObjectStore};
use super::types::{ChunkMeta, StoredRecord};
use crate::data_fetcher::models::Fixture;
use crate::error::AppError;

/// Number of chunks needed for `total` records
pub fn chunk_count(total: usize, chunk_size: usize) -> usize {
    total.div_ceil(chunk_size.max(1))
}

/// Splits `fixtures` into slices of at most `chunk_size` records
pub fn split_chunks(fixtures: &[Fixture], chunk_size: usize) -> Vec<&[Fixture]> {
    fixtures.chunks(chunk_size.max(1)).collect()
}

fn encode(record: &StoredRecord, key: &str) -> Result<String, AppError> {
    serde_json::to_string(record).map_err(|e| AppError::store_write(key, e.to_string()))
}

fn decode(data: &str, key: &str) -> Result<StoredRecord, AppError> {
    serde_json::from_str(data).map_err(|e| AppError::store_read(key, format!("corrupt record: {e}")))
}

/// Reads the meta record under `key`, or `None` when absent or not describing `id`
pub async fn read_meta(
    store: &dyn ObjectStore,
    key: &str,
    id: EntryId,
) -> Result<Option<(ChunkMeta, ObjectMetadata)>, AppError> {
    let meta_key = chunk_meta_key(key);
    let Some(object) = store.get(&meta_key).await? else {
        return Ok(None);
    };
    match decode(&object.data, &meta_key)? {
        StoredRecord::ChunkMeta(meta) if meta.describes(id) => Ok(Some((meta, object.metadata))),
        other => {
            warn!(
                key = %meta_key,
                entry = %id,
                record = ?std::mem::discriminant(&other),
                "meta record does not describe this entry, treating as miss"
            );
            Ok(None)
        }
    }
}

/// Writes `fixtures` as a chunk set under `key`.
///
/// Chunks are written before the meta record, so a reader never finds a
/// fresh meta that names chunks this write has not stored yet. Every record
/// of the write carries a fresh generation tag; when a chunk write fails, the
/// chunks that did land no longer match the standing meta and the set reads
/// as a miss. Chunks left over from an earlier, longer set are removed
/// afterwards.
#[instrument(skip(store, fixtures, metadata), fields(total = fixtures.len()))]
pub async fn write_chunked(
    store: &dyn ObjectStore,
    key: &str,
    id: EntryId,
    fixtures: &[Fixture],
    chunk_size: usize,
    metadata: ObjectMetadata,
) -> Result<ChunkMeta, AppError> {
    let previous_count = match read_meta(store, key, id).await {
        Ok(previous) => previous.map(|(meta, _)| meta.chunk_count).unwrap_or(0),
        Err(e) => {
            debug!(key, error = %e, "could not read previous chunk meta");
            0
        }
    };

    let chunks = split_chunks(fixtures, chunk_size);
    let meta = ChunkMeta {
        total: fixtures.len(),
        chunk_count: chunks.len(),
        date: id.date,
        is_live: id.is_live,
        generation: rand::rng().random(),
    };

    let generation = meta.generation;
    let writes = chunks.iter().enumerate().map(|(index, chunk)| {
        let chunk_key = chunk_key(key, index);
        let metadata = metadata.clone();
        async move {
            let data = encode(
                &StoredRecord::Chunk {
                    index,
                    generation,
                    fixtures: chunk.to_vec(),
                },
                &chunk_key,
            )?;
            store.set(&chunk_key, data, metadata).await
        }
    });
    try_join_all(writes).await?;

    let meta_key = chunk_meta_key(key);
    let data = encode(&StoredRecord::ChunkMeta(meta), &meta_key)?;
    store.set(&meta_key, data, metadata).await?;

    for index in meta.chunk_count..previous_count {
        let surplus = chunk_key(key, index);
        if let Err(e) = store.delete(&surplus).await {
            warn!(key = %surplus, error = %e, "failed to remove surplus chunk");
        }
    }

    debug!(
        key,
        total = meta.total,
        chunk_count = meta.chunk_count,
        "wrote chunked fixtures"
    );
    Ok(meta)
}

/// Reads a chunk set under `key`.
///
/// Returns `None` when the meta is absent, when any chunk is missing, out
/// of place or from another write, or when the reassembled length disagrees with the meta.
#[instrument(skip(store))]
pub async fn read_chunked(
    store: &dyn ObjectStore,
    key: &str,
    id: EntryId,
) -> Result<Option<(Vec<Fixture>, ObjectMetadata)>, AppError> {
    let Some((meta, metadata)) = read_meta(store, key, id).await? else {
        return Ok(None);
    };

    let reads = (0..meta.chunk_count).map(|index| {
        let chunk_key = chunk_key(key, index);
        async move {
            let object = store.get(&chunk_key).await?;
            Ok::<_, AppError>(object.map(|o| (chunk_key, o.data)))
        }
    });
    let objects = try_join_all(reads).await?;

    let mut fixtures = Vec::with_capacity(meta.total);
    for (index, object) in objects.into_iter().enumerate() {
        let Some((chunk_key, data)) = object else {
            warn!(key, index, chunk_count = meta.chunk_count, "chunk missing, set is incomplete");
            return Ok(None);
        };
        match decode(&data, &chunk_key)? {
            StoredRecord::Chunk {
                index: stored_index,
                generation,
                fixtures: chunk,
            } if stored_index == index && generation == meta.generation => {
                fixtures.extend(chunk)
            }
            StoredRecord::Chunk { generation, .. } if generation != meta.generation => {
                warn!(
                    key = %chunk_key,
                    index,
                    expected = meta.generation,
                    found = generation,
                    "chunk belongs to another write, set is invalid"
                );
                return Ok(None);
            }
            _ => {
                warn!(key = %chunk_key, index, "chunk record out of place, set is invalid");
                return Ok(None);
            }
        }
    }

    if fixtures.len() != meta.total {
        warn!(
            key,
            expected = meta.total,
            actual = fixtures.len(),
            "chunk set length disagrees with meta"
        );
        return Ok(None);
    }

    Ok(Some((fixtures, metadata)))
}

/// Whether a meta record exists under `key`
pub async fn chunked_exists(store: &dyn ObjectStore, key: &str) -> Result<bool, AppError> {
    store.exists(&chunk_meta_key(key)).await
}

/// Deletes a chunk set. The meta goes first so the set stops resolving
/// immediately; chunks are then removed by the count the meta recorded, or
/// by probing when the meta is already gone.
pub async fn delete_chunked(
    store: &dyn ObjectStore,
    key: &str,
    id: EntryId,
) -> Result<bool, AppError> {
    let known_count = read_meta(store, key, id)
        .await
        .ok()
        .flatten()
        .map(|(meta, _)| meta.chunk_count);

    let removed_meta = store.delete(&chunk_meta_key(key)).await?;

    let mut removed_any = removed_meta;
    match known_count {
        Some(count) => {
            for index in 0..count {
                removed_any |= store.delete(&chunk_key(key, index)).await?;
            }
        }
        None => {
            let mut index = 0;
            while store.delete(&chunk_key(key, index)).await? {
                removed_any = true;
                index += 1;
            }
        }
    }
    Ok(removed_any)
}
