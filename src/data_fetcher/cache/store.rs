//! Object store abstraction.
//!
//! The engine talks to its backing key/value store only through
//! [`ObjectStore`]. Every call is an independent, fallible operation: there is
//! no transaction spanning two keys, and callers must re-verify compound
//! operations such as [`ObjectStore::move_object`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::strategy::Strategy;
use crate::error::AppError;

/// Per-entry metadata kept next to the stored value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    pub updated_at: DateTime<Utc>,
    pub ttl_seconds: u64,
    pub strategy: Strategy,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_flags: BTreeMap<String, String>,
}

impl ObjectMetadata {
    pub fn new(updated_at: DateTime<Utc>, strategy: Strategy) -> Self {
        Self {
            updated_at,
            ttl_seconds: strategy.ttl_seconds(),
            strategy,
            custom_flags: BTreeMap::new(),
        }
    }

    pub fn with_flag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_flags.insert(name.into(), value.into());
        self
    }

    /// Age of the entry at `now`, clamped at zero for clocks that disagree
    pub fn age_seconds(&self, now: DateTime<Utc>) -> u64 {
        (now - self.updated_at).num_seconds().max(0) as u64
    }
}

/// A value read back from the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub data: String,
    pub metadata: ObjectMetadata,
}

#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug {
    /// Backend name for log events
    fn name(&self) -> &'static str;

    /// Largest value the backend accepts, if it has a ceiling
    fn max_value_bytes(&self) -> Option<usize> {
        None
    }

    /// Writes `data` under `key`, replacing any previous value
    async fn set(&self, key: &str, data: String, metadata: ObjectMetadata)
    -> Result<(), AppError>;

    async fn get(&self, key: &str) -> Result<Option<StoredObject>, AppError>;

    async fn exists(&self, key: &str) -> Result<bool, AppError>;

    /// Removes `key`. Returns whether something was removed.
    async fn delete(&self, key: &str) -> Result<bool, AppError>;

    /// Copies `from` to `to` and then deletes `from`.
    ///
    /// Returns `Ok(false)` when `from` does not exist. The two steps are not
    /// atomic: if the delete fails the value is left in both locations, and
    /// a write that timed out but landed can leave it in both as well. A
    /// failure before the write completes leaves it only at `from`.
    async fn move_object(&self, from: &str, to: &str) -> Result<bool, AppError> {
        let Some(object) = self.get(from).await? else {
            return Ok(false);
        };
        self.set(to, object.data, object.metadata)
            .await
            .map_err(|e| AppError::store_move(from, to, format!("copy failed: {e}")))?;
        self.delete(from)
            .await
            .map_err(|e| AppError::store_move(from, to, format!("delete failed: {e}")))?;
        Ok(true)
    }
}
