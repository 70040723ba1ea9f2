//! Directory-backed object store.
//!
//! Each key is one file holding a JSON envelope with the value and its
//! metadata. Writes go to a temporary sibling and are renamed into place, so
//! a reader sees either the old or the new envelope.

use async_trait::async_trait;
use rand::Rng;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{trace, warn};

use super::store::{ObjectMetadata, ObjectStore, StoredObject};
use crate::constants::store::FILE_STORE_EXTENSION;
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    max_value_bytes: Option<usize>,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_value_bytes: None,
        }
    }

    pub fn with_max_value_bytes(mut self, limit: usize) -> Self {
        self.max_value_bytes = Some(limit);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a store key onto a path below the root.
    ///
    /// `/` separates directories; `:` is not portable in file names and is
    /// replaced. Empty, `.` and `..` segments are rejected.
    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        let mut path = self.root.clone();
        let segments: Vec<&str> = key.split('/').collect();
        for (i, segment) in segments.iter().enumerate() {
            if segment.is_empty() || *segment == "." || *segment == ".." {
                return Err(AppError::store_read(key, "key is not a valid relative path"));
            }
            let segment = segment.replace(':', "~");
            if i + 1 == segments.len() {
                path.push(format!("{segment}.{FILE_STORE_EXTENSION}"));
            } else {
                path.push(segment);
            }
        }
        Ok(path)
    }
}

/// Hidden sibling of `path` unique to this process and write, so concurrent
/// writers of one key never share a temporary file.
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix: u64 = rand::rng().random();
    path.with_file_name(format!(
        ".{name}.tmp.{}.{suffix:016x}",
        std::process::id()
    ))
}

#[async_trait]
impl ObjectStore for FileStore {
    fn name(&self) -> &'static str {
        "file"
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

        let path = self
            .path_for(key)
            .map_err(|e| AppError::store_write(key, e.to_string()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::store_write(key, e.to_string()))?;
        }

        let envelope = serde_json::to_vec(&StoredObject { data, metadata })
            .map_err(|e| AppError::store_write(key, e.to_string()))?;

        let tmp_path = temp_path_for(&path);
        let write = async {
            let mut file = fs::File::create(&tmp_path).await?;
            file.write_all(&envelope).await?;
            file.flush().await?;
            fs::rename(&tmp_path, &path).await
        };
        if let Err(e) = write.await {
            if let Err(cleanup) = fs::remove_file(&tmp_path).await
                && cleanup.kind() != ErrorKind::NotFound
            {
                warn!(key, error = %cleanup, "failed to remove temporary store file");
            }
            return Err(AppError::store_write(key, e.to_string()));
        }

        trace!(key, path = %path.display(), "file store set");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>, AppError> {
        let path = self.path_for(key)?;
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AppError::store_read(key, e.to_string())),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| AppError::store_read(key, format!("corrupt envelope: {e}")))
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        let path = self.path_for(key)?;
        fs::try_exists(&path)
            .await
            .map_err(|e| AppError::store_read(key, e.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<bool, AppError> {
        let path = self
            .path_for(key)
            .map_err(|e| AppError::store_write(key, e.to_string()))?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::store_write(key, e.to_string())),
        }
    }
}
