//! Hydration gate.
//!
//! Route decisions must wait until the persisted session has been restored.
//! Mounting the gate starts the restore immediately and, if storage has not
//! answered within [`HYDRATION_FALLBACK`], forces the store hydrated so the
//! client never hangs on a stuck or disabled storage backend.

use crate::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// How long mount waits for storage before forcing hydration.
pub const HYDRATION_FALLBACK: Duration = Duration::from_millis(100);

/// Blocks auth-dependent decisions until the session store is hydrated.
#[derive(Debug, Clone)]
pub struct HydrationGate {
    store: Arc<SessionStore>,
    fallback: Duration,
}

impl HydrationGate {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self::with_fallback(store, HYDRATION_FALLBACK)
    }

    pub fn with_fallback(store: Arc<SessionStore>, fallback: Duration) -> Self {
        Self { store, fallback }
    }

    pub fn hydrated(&self) -> bool {
        self.store.is_hydrated()
    }

    /// Restore the session and wait for hydration, bounded by the fallback.
    ///
    /// Always returns with the store hydrated.
    pub async fn mount(&self) -> bool {
        if self.store.is_hydrated() {
            return true;
        }

        let mut rx = self.store.subscribe();
        let store = Arc::clone(&self.store);
        // Storage reads are blocking file IO. The task is left detached when
        // the fallback fires; a late restore still lands in the store.
        let _restore = tokio::task::spawn_blocking(move || store.rehydrate());

        let restored = tokio::time::timeout(self.fallback, rx.wait_for(|s| s.hydrated))
            .await
            .map(|res| res.is_ok())
            .unwrap_or(false);

        if restored {
            debug!("Session hydrated from storage");
        } else {
            warn!(
                fallback_ms = self.fallback.as_millis() as u64,
                "Session storage did not answer in time, forcing hydration"
            );
            self.store.set_hydrated();
        }

        true
    }

    /// Wait until something else has hydrated the store.
    pub async fn wait(&self) {
        let mut rx = self.store.subscribe();
        let _ = rx.wait_for(|s| s.hydrated).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::sample_user;
    use crate::{TokenPair, SESSION_ENVELOPE_VERSION};
    use client_storage::{
        ClientStorage, SessionEnvelope, StorageBackend, StorageError, StorageKeys, StorageResult,
    };
    use std::sync::mpsc;
    use std::sync::Mutex;

    /// Backend whose reads block until the test releases them, then fail.
    struct StalledStorage {
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl StorageBackend for StalledStorage {
        fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Ok(())
        }

        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            let release = self.release.lock().unwrap();
            let _ = release.recv_timeout(Duration::from_secs(5));
            Err(StorageError::Backend("storage disabled".into()))
        }

        fn delete(&self, _key: &str) -> StorageResult<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_mount_restores_persisted_session() {
        let storage = client_storage::memory_storage();
        let mut session = crate::Session::default();
        session.user = Some(sample_user());
        session.access_token = Some("a".into());
        session.refresh_token = Some("r".into());
        session.is_authenticated = true;
        storage.set_json(
            StorageKeys::AUTH_SESSION,
            &SessionEnvelope::wrap(session, SESSION_ENVELOPE_VERSION),
        );

        let store = Arc::new(SessionStore::new(storage));
        let gate = HydrationGate::new(Arc::clone(&store));
        assert!(!gate.hydrated());

        assert!(gate.mount().await);
        assert!(store.is_authenticated());
        assert_eq!(store.access_token().as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_mount_forces_hydration_when_storage_stalls() {
        let (release, rx) = mpsc::channel();
        let storage = ClientStorage::new(Arc::new(StalledStorage {
            release: Mutex::new(rx),
        }));
        let store = Arc::new(SessionStore::new(storage));
        let gate = HydrationGate::new(Arc::clone(&store));

        let started = std::time::Instant::now();
        assert!(gate.mount().await);
        assert!(store.is_hydrated());
        assert!(!store.is_authenticated());
        assert!(started.elapsed() < Duration::from_secs(2));

        let _ = release.send(());
    }

    #[tokio::test]
    async fn test_hydration_transition_is_observed_once() {
        let store = Arc::new(SessionStore::new(client_storage::memory_storage()));
        let mut rx = store.subscribe();
        let gate = HydrationGate::new(Arc::clone(&store));

        gate.mount().await;
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().hydrated);

        gate.mount().await;
        store.set_hydrated();
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_wait_returns_after_login() {
        let store = Arc::new(SessionStore::new(client_storage::memory_storage()));
        let gate = HydrationGate::new(Arc::clone(&store));

        let waiter = tokio::spawn({
            let gate = gate.clone();
            async move { gate.wait().await }
        });
        store
            .set_auth(sample_user(), TokenPair::new("a", "r"))
            .unwrap();
        waiter.await.unwrap();
        assert!(gate.hydrated());
    }
}
