//! Error types surfaced to callers of the API client.

use session_store::SessionError;
use thiserror::Error;

/// Errors from backend calls.
///
/// The messages are user-facing; callers display them as-is.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received (connection refused, DNS, timeout).
    #[error("Network Error: Unable to connect to server")]
    Network,

    /// The server answered with an HTML error page instead of JSON.
    #[error("Server Error ({status}): The server returned an HTML error page.")]
    HtmlErrorPage { status: u16 },

    /// The server rejected the request.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// Authentication expired and could not be renewed.
    #[error("Please log in to continue")]
    LoginRequired,

    /// Client-side login throttle tripped.
    #[error("Too many failed login attempts. Please try again in {retry_after_minutes} minutes.")]
    TooManyAttempts { retry_after_minutes: i64 },

    /// A successful response had an unexpected shape.
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network)
    }

    /// The session is gone and the user has been sent to login.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, ApiError::LoginRequired)
    }

    /// HTTP status of the failed response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HtmlErrorPage { status } | ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias using ApiError.
pub type ApiResult<T> = Result<T, ApiError>;
