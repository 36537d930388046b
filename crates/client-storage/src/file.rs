//! JSON-file storage backend.
//!
//! The file is the source of truth. Every read loads it and every mutation
//! re-reads, applies and rewrites it through a temp file + rename, so several
//! processes sharing one file keep each other's keys.

use crate::{StorageBackend, StorageError, StorageResult};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

type Entries = BTreeMap<String, String>;

/// Storage persisted as a flat JSON object on disk.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file at `path`.
    ///
    /// A corrupt file is treated as empty and overwritten on the next write.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let storage = Self {
            path: path.to_path_buf(),
            lock: Mutex::new(()),
        };
        storage.load()?;
        Ok(storage)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StorageResult<Entries> {
        match fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(map) => Ok(map),
                Err(err) => {
                    warn!(path = %self.path.display(), error = %err, "Discarding unreadable storage file");
                    Ok(Entries::new())
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(err) => Err(StorageError::Io(err)),
        }
    }

    fn flush(&self, data: &Entries) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(data)?;
        // Per-process temp name so concurrent writers never share one.
        let tmp = self
            .path
            .with_extension(format!("json.{}.tmp", std::process::id()));
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl StorageBackend for FileStorage {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.lock.lock();
        let mut data = self.load()?;
        data.insert(key.to_string(), value.to_string());
        self.flush(&data)
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.load()?.remove(key))
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        let _guard = self.lock.lock();
        let mut data = self.load()?;
        let existed = data.remove(key).is_some();
        if existed {
            self.flush(&data)?;
        }
        Ok(existed)
    }
}
