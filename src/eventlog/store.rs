//! Durable string-blob stores addressed by key.
//!
//! [`FileLogStore`] keeps each key in `<dir>/<key>.jsonl` and creates the
//! directory on first write.  [`MemoryLogStore`] keeps everything in a map
//! and is what tests use.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("log store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("log store unavailable: {0}")]
    Unavailable(String),
}

/// Key-addressed blob store with an append primitive.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Whole value for `key`, `None` if nothing was ever written.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value for `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Append `data` to the value for `key`, creating it if needed.
    async fn append(&self, key: &str, data: &str) -> Result<(), StoreError>;
}

// Compile-time assertion: Box<dyn LogStore> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn LogStore>) {}
};

// ---------------------------------------------------------------------------
// FileLogStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FileLogStore {
    dir: PathBuf,
}

impl FileLogStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.jsonl"))
    }
}

#[async_trait]
impl LogStore for FileLogStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.path_for(key), value).await?;
        Ok(())
    }

    async fn append(&self, key: &str, data: &str) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(key))
            .await?;
        file.write_all(data.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryLogStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryLogStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))
    }
}

#[async_trait]
impl LogStore for MemoryLogStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn append(&self, key: &str, data: &str) -> Result<(), StoreError> {
        self.lock()?.entry(key.to_string()).or_default().push_str(data);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
