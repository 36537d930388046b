//! Backend seam for key-value client storage.

use crate::StorageResult;

/// String key-value store, shaped like browser web storage.
///
/// Implementations report failures; [`crate::ClientStorage`] decides to
/// absorb them.
pub trait StorageBackend: Send + Sync {
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Returns whether the key existed.
    fn delete(&self, key: &str) -> StorageResult<bool>;

    fn has(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}
