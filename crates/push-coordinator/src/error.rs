//! Push error types.
//!
//! These never escape the coordinator; they exist so platform and registry
//! implementations can report what went wrong for logging.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PushError {
    /// Push is not available on this platform.
    #[error("Push notifications are not supported on this platform")]
    Unsupported,

    /// A platform capability (permission, service worker, display) failed.
    #[error("Platform error: {0}")]
    Platform(String),

    /// The messaging service could not issue or revoke a token.
    #[error("Push service error: {0}")]
    PushService(String),

    /// The backend rejected a device registration call.
    #[error("Device registry error: {0}")]
    Registry(#[from] api_client::ApiError),
}

/// Result type alias using PushError.
pub type PushResult<T> = Result<T, PushError>;
