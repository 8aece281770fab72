//! Local JSON persistence: one `<collection>.json` array per resource.
//!
//! Used both as the fallback read tier and as a write-through cache. Writes go
//! through a temp file and a rename so a crash mid-write never leaves a
//! truncated collection behind.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::sync::Mutex;

use crate::db::error::StoreResult;

pub struct LocalStore {
    dir: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{}.json", collection))
    }

    /// Read a collection. `Ok(None)` means the file does not exist yet.
    ///
    /// A file holding a single object (older singleton files) is returned as a
    /// one-element array.
    pub async fn read(&self, collection: &str) -> StoreResult<Option<Vec<Value>>> {
        let path = self.path_for(collection);
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if data.trim().is_empty() {
            return Ok(Some(Vec::new()));
        }

        match serde_json::from_str::<Value>(&data)? {
            Value::Array(items) => Ok(Some(items)),
            Value::Null => Ok(Some(Vec::new())),
            other => Ok(Some(vec![other])),
        }
    }

    /// Replace a collection file atomically.
    pub async fn write(&self, collection: &str, items: &[Value]) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        self.write_unlocked(collection, items).await
    }

    /// Read-modify-write a collection under the write lock.
    ///
    /// When the file does not exist yet the closure starts from `seed`.
    pub async fn update<F>(&self, collection: &str, seed: Vec<Value>, apply: F) -> StoreResult<()>
    where
        F: FnOnce(&mut Vec<Value>),
    {
        let _guard = self.write_lock.lock().await;
        let mut items = self.read(collection).await?.unwrap_or(seed);
        apply(&mut items);
        self.write_unlocked(collection, &items).await
    }

    async fn write_unlocked(&self, collection: &str, items: &[Value]) -> StoreResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(collection);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(items)?;

        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;

        tracing::debug!("Wrote {} records to {}", items.len(), path.display());
        Ok(())
    }
}
