//! Client-side login attempt limiter.
//!
//! This is a UX affordance only. The counter lives in durable local storage
//! and anyone can clear it; real throttling has to happen on the server.

use chrono::{DateTime, Duration, TimeZone, Utc};
use client_storage::{ClientStorage, StorageKeys};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Failed attempts allowed inside one window.
pub const MAX_LOGIN_ATTEMPTS: u32 = 5;

const WINDOW_MINUTES: i64 = 15;

/// Persisted counter: `{ "attempts": n, "timestamp": <ms since epoch> }`.
///
/// `timestamp` marks the first failure of the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginAttempts {
    pub attempts: u32,
    pub timestamp: i64,
}

impl LoginAttempts {
    fn started_at(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.timestamp)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitStatus {
    Allowed { remaining: u32 },
    Blocked { retry_after: Duration },
}

impl RateLimitStatus {
    pub fn is_blocked(&self) -> bool {
        matches!(self, RateLimitStatus::Blocked { .. })
    }

    /// Minutes until the window reopens, rounded up.
    pub fn retry_after_minutes(&self) -> Option<i64> {
        match self {
            RateLimitStatus::Blocked { retry_after } => {
                let secs = retry_after.num_seconds().max(0);
                Some(((secs + 59) / 60).max(1))
            }
            RateLimitStatus::Allowed { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoginRateLimiter {
    storage: ClientStorage,
    max_attempts: u32,
    window: Duration,
}

impl LoginRateLimiter {
    pub fn new(storage: ClientStorage) -> Self {
        Self {
            storage,
            max_attempts: MAX_LOGIN_ATTEMPTS,
            window: Duration::minutes(WINDOW_MINUTES),
        }
    }

    /// Current counter, dropping it if its window has elapsed.
    fn current(&self, now: DateTime<Utc>) -> Option<LoginAttempts> {
        let attempts: LoginAttempts = self.storage.get_json(StorageKeys::LOGIN_RATE_LIMIT)?;
        if now - attempts.started_at() >= self.window {
            debug!("Login rate limit window elapsed");
            self.storage.remove(StorageKeys::LOGIN_RATE_LIMIT);
            return None;
        }
        Some(attempts)
    }

    fn status_of(&self, attempts: Option<LoginAttempts>, now: DateTime<Utc>) -> RateLimitStatus {
        match attempts {
            Some(a) if a.attempts >= self.max_attempts => RateLimitStatus::Blocked {
                retry_after: self.window - (now - a.started_at()),
            },
            Some(a) => RateLimitStatus::Allowed {
                remaining: self.max_attempts - a.attempts,
            },
            None => RateLimitStatus::Allowed {
                remaining: self.max_attempts,
            },
        }
    }

    pub fn check(&self, now: DateTime<Utc>) -> RateLimitStatus {
        let attempts = self.current(now);
        self.status_of(attempts, now)
    }

    /// Count a failed login.
    pub fn record_failure(&self, now: DateTime<Utc>) -> RateLimitStatus {
        let next = match self.current(now) {
            Some(a) => LoginAttempts {
                attempts: a.attempts.saturating_add(1),
                timestamp: a.timestamp,
            },
            None => LoginAttempts {
                attempts: 1,
                timestamp: now.timestamp_millis(),
            },
        };
        self.storage.set_json(StorageKeys::LOGIN_RATE_LIMIT, &next);

        let status = self.status_of(Some(next), now);
        if status.is_blocked() {
            warn!(attempts = next.attempts, "Login attempts exhausted for this window");
        }
        status
    }

    /// Forget all failures, after a successful login.
    pub fn reset(&self) {
        self.storage.remove(StorageKeys::LOGIN_RATE_LIMIT);
    }
}
