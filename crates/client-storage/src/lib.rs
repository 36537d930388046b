//! Key-value storage for the CCSMS client.
//!
//! Two scopes exist:
//! - **durable**: survives across sessions (theme, push token, login rate limit)
//! - **tab**: one per session scope (the persisted auth session)
//!
//! Both are backed by the same [`StorageBackend`] seam, with a JSON file
//! implementation for the CLI and an in-memory one for tests.

mod client;
mod envelope;
mod file;
mod keys;
mod memory;
mod traits;

pub use client::ClientStorage;
pub use envelope::SessionEnvelope;
pub use file::FileStorage;
pub use keys::StorageKeys;
pub use memory::MemoryStorage;
pub use traits::StorageBackend;

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backing store could not be read or written
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Encoding(err.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Open a file-backed [`ClientStorage`] at `path`.
pub fn open_file_storage(path: &Path) -> StorageResult<ClientStorage> {
    let backend = FileStorage::open(path)?;
    Ok(ClientStorage::new(Arc::new(backend)))
}

/// An in-memory [`ClientStorage`], used by tests and headless runs.
pub fn memory_storage() -> ClientStorage {
    ClientStorage::new(Arc::new(MemoryStorage::new()))
}
