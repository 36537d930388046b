//! Hook for keeping in-memory session state in step with the interceptor.

use session_store::SessionStore;

/// Notified when the interceptor rewrites or drops the persisted session.
pub trait SessionObserver: Send + Sync {
    fn tokens_refreshed(&self, access_token: &str, refresh_token: Option<&str>);
    fn session_cleared(&self);
}

impl SessionObserver for SessionStore {
    fn tokens_refreshed(&self, access_token: &str, refresh_token: Option<&str>) {
        self.sync_refreshed_tokens(access_token, refresh_token);
    }

    fn session_cleared(&self) {
        self.sync_cleared();
    }
}
