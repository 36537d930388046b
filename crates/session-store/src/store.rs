//! Persisted session store.

use crate::{Session, SessionResult, TokenPair, User, UserPatch};
use client_storage::{ClientStorage, SessionEnvelope, StorageKeys};
use tokio::sync::watch;
use tracing::{debug, info};

/// Version written into the `{state, version}` envelope.
pub const SESSION_ENVELOPE_VERSION: u32 = 0;

/// Owner of the in-memory session and its tab-scoped persisted copy.
///
/// State changes are published through a watch channel so observers (the
/// hydration gate, the push coordinator, the CLI) react to transitions
/// instead of polling.
pub struct SessionStore {
    storage: ClientStorage,
    state: watch::Sender<Session>,
}

impl SessionStore {
    /// Create an empty, not-yet-hydrated store over the tab-scoped storage.
    pub fn new(storage: ClientStorage) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self { storage, state }
    }

    /// The storage the session is persisted to.
    pub fn storage(&self) -> &ClientStorage {
        &self.storage
    }

    /// Current state.
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn is_hydrated(&self) -> bool {
        self.state.borrow().hydrated
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.borrow().access_token.clone()
    }

    /// Restore the persisted session and mark the store hydrated.
    ///
    /// Both envelope shapes are accepted; anything unreadable is treated as
    /// no session at all.
    pub fn rehydrate(&self) {
        let restored = self
            .storage
            .get_json::<SessionEnvelope<Session>>(StorageKeys::AUTH_SESSION)
            .map(|envelope| envelope.into_state().normalized());

        self.state.send_if_modified(|session| {
            let mut changed = !session.hydrated;
            session.hydrated = true;
            if let Some(mut restored) = restored {
                restored.hydrated = true;
                if *session != restored {
                    *session = restored;
                    changed = true;
                }
            }
            changed
        });

        let session = self.state.borrow();
        debug!(
            authenticated = session.is_authenticated,
            user_id = session.user.as_ref().map(|u| u.id.as_str()).unwrap_or(""),
            "Session rehydrated"
        );
    }

    /// Store a freshly issued session.
    pub fn set_auth(&self, user: User, tokens: TokenPair) -> SessionResult<()> {
        tokens.validate()?;

        info!(user_id = %user.id, role = %user.role, "Session established");
        self.state.send_modify(|session| {
            *session = Session {
                user: Some(user),
                access_token: Some(tokens.access_token),
                refresh_token: Some(tokens.refresh_token),
                is_authenticated: true,
                hydrated: true,
            };
        });
        self.persist();
        Ok(())
    }

    /// Sign out locally. The cleared state is persisted.
    pub fn clear_auth(&self) {
        self.state.send_modify(Session::clear);
        self.persist();
        info!("Session cleared");
    }

    /// Merge `patch` into the current user. No-op when signed out.
    pub fn update_user(&self, patch: UserPatch) {
        let changed = self.state.send_if_modified(|session| match session.user.as_mut() {
            Some(user) => {
                user.apply(patch);
                true
            }
            None => false,
        });
        if changed {
            self.persist();
        }
    }

    /// Mark the store hydrated. Safe to call any number of times; only the
    /// first call notifies subscribers.
    pub fn set_hydrated(&self) {
        self.state.send_if_modified(|session| {
            if session.hydrated {
                false
            } else {
                session.hydrated = true;
                true
            }
        });
    }

    /// Mirror tokens that were refreshed directly in storage.
    ///
    /// The persisted envelope has already been written by the refresher, so
    /// only memory is updated here.
    pub fn sync_refreshed_tokens(&self, access_token: &str, refresh_token: Option<&str>) {
        self.state.send_if_modified(|session| {
            if !session.is_authenticated {
                return false;
            }
            session.access_token = Some(access_token.to_string());
            if let Some(refresh) = refresh_token {
                session.refresh_token = Some(refresh.to_string());
            }
            true
        });
        debug!(rotated = refresh_token.is_some(), "Session tokens refreshed");
    }

    /// Mirror a session that was removed from storage by someone else.
    pub fn sync_cleared(&self) {
        self.state.send_if_modified(|session| {
            if !session.is_authenticated && session.user.is_none() && session.access_token.is_none() {
                return false;
            }
            session.clear();
            true
        });
    }

    fn persist(&self) {
        let session = self.snapshot();
        let envelope = SessionEnvelope::wrap(session, SESSION_ENVELOPE_VERSION);
        self.storage.set_json(StorageKeys::AUTH_SESSION, &envelope);
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*self.state.borrow())
            .finish()
    }
}
