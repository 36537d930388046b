//! Storage key constants.

/// Storage keys used by the client.
pub struct StorageKeys;

impl StorageKeys {
    /// Persisted auth session (tab scope)
    pub const AUTH_SESSION: &'static str = "auth-session";

    /// Cached push registration token (durable scope)
    pub const PUSH_TOKEN: &'static str = "fcm_token";

    /// Theme preference (durable scope)
    pub const THEME: &'static str = "theme";

    /// Login attempt counter (durable scope)
    pub const LOGIN_RATE_LIMIT: &'static str = "loginRateLimit";
}
