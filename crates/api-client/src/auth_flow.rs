//! Login and logout.

use crate::{ApiClient, ApiError, ApiResult};
use chrono::{DateTime, Utc};
use session_store::{LoginRateLimiter, RateLimitStatus, SessionStore, User};
use std::sync::Arc;
use tracing::{info, warn};

/// Drives sign-in and sign-out against the backend and the session store.
#[derive(Clone)]
pub struct AuthFlow {
    client: Arc<ApiClient>,
    store: Arc<SessionStore>,
    limiter: LoginRateLimiter,
}

impl AuthFlow {
    /// `limiter` must be backed by durable storage so the count outlives a session.
    pub fn new(client: Arc<ApiClient>, store: Arc<SessionStore>, limiter: LoginRateLimiter) -> Self {
        Self {
            client,
            store,
            limiter,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<User> {
        self.login_at(email, password, Utc::now()).await
    }

    /// Login with an explicit clock, for the rate limiter.
    pub async fn login_at(&self, email: &str, password: &str, now: DateTime<Utc>) -> ApiResult<User> {
        let status = self.limiter.check(now);
        if let Some(minutes) = status.retry_after_minutes() {
            warn!(retry_after_minutes = minutes, "Login blocked by client-side rate limit");
            return Err(ApiError::TooManyAttempts {
                retry_after_minutes: minutes,
            });
        }

        match self.authenticate(email, password).await {
            Ok(user) => {
                self.limiter.reset();
                self.client.reset_login_redirect();
                info!(user_id = %user.id, role = %user.role, "Logged in");
                Ok(user)
            }
            Err(err) => {
                // Unreachable server is not a failed attempt.
                if !err.is_network() {
                    if let RateLimitStatus::Allowed { remaining } = self.limiter.record_failure(now) {
                        warn!(remaining, error = %err, "Login failed");
                    }
                }
                Err(err)
            }
        }
    }

    async fn authenticate(&self, email: &str, password: &str) -> ApiResult<User> {
        let payload = self.client.auth().login(email, password).await?;
        let (user, tokens) = payload.into_parts()?;
        self.store.set_auth(user.clone(), tokens)?;
        Ok(user)
    }

    /// Best-effort server logout, then clear the local session regardless.
    pub async fn logout(&self) {
        if self.store.is_authenticated() {
            if let Err(err) = self.client.auth().logout().await {
                warn!(error = %err, "Server logout failed, clearing local session anyway");
            }
        }
        self.store.clear_auth();
    }
}

impl std::fmt::Debug for AuthFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthFlow").finish_non_exhaustive()
    }
}
