//! Fail-soft storage handle.

use crate::StorageBackend;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// Shared handle over a storage backend.
///
/// Every read and write swallows backend errors: a failed read behaves as an
/// empty store and a failed write is logged and dropped. Callers never see a
/// storage exception.
#[derive(Clone)]
pub struct ClientStorage {
    backend: Arc<dyn StorageBackend>,
}

impl ClientStorage {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub fn get_raw(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "Storage read failed, treating as empty");
                None
            }
        }
    }

    /// Write a raw value. Returns false if the write was dropped.
    pub fn set_raw(&self, key: &str, value: &str) -> bool {
        match self.backend.set(key, value) {
            Ok(()) => true,
            Err(err) => {
                warn!(key, error = %err, "Storage write failed");
                false
            }
        }
    }

    pub fn remove(&self, key: &str) {
        if let Err(err) = self.backend.delete(key) {
            warn!(key, error = %err, "Storage delete failed");
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.backend.has(key).unwrap_or(false)
    }

    /// Read and decode a JSON value. Undecodable content reads as absent.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, error = %err, "Stored value is not valid JSON");
                None
            }
        }
    }

    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> bool {
        match serde_json::to_string(value) {
            Ok(raw) => self.set_raw(key, &raw),
            Err(err) => {
                warn!(key, error = %err, "Failed to encode value for storage");
                false
            }
        }
    }
}

impl std::fmt::Debug for ClientStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientStorage").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StorageError, StorageResult};
    use serde::Deserialize;

    /// Backend that fails every call, like storage disabled in private browsing.
    struct BrokenStorage;

    impl StorageBackend for BrokenStorage {
        fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Backend("quota exceeded".into()))
        }

        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::Backend("access denied".into()))
        }

        fn delete(&self, _key: &str) -> StorageResult<bool> {
            Err(StorageError::Backend("access denied".into()))
        }
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Counter {
        attempts: u32,
    }

    #[test]
    fn test_broken_backend_behaves_as_empty() {
        let storage = ClientStorage::new(Arc::new(BrokenStorage));

        assert_eq!(storage.get_raw("auth-session"), None);
        assert!(!storage.set_raw("auth-session", "{}"));
        assert!(!storage.contains("auth-session"));
        storage.remove("auth-session");
        assert_eq!(storage.get_json::<Counter>("loginRateLimit"), None);
    }

    #[test]
    fn test_json_values() {
        let storage = crate::memory_storage();

        assert!(storage.set_json("loginRateLimit", &Counter { attempts: 3 }));
        assert_eq!(
            storage.get_json::<Counter>("loginRateLimit"),
            Some(Counter { attempts: 3 })
        );

        storage.set_raw("loginRateLimit", "garbage");
        assert_eq!(storage.get_json::<Counter>("loginRateLimit"), None);
    }
}
