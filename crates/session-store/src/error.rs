//! Session error types.

use thiserror::Error;

/// Errors raised by session operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Login response did not carry a usable token pair.
    #[error("Invalid response from server")]
    MissingTokens,

    /// A token was present but empty.
    #[error("Invalid {0}")]
    InvalidToken(&'static str),

    /// No user is signed in.
    #[error("Not logged in")]
    NotAuthenticated,
}

/// Result type alias using SessionError.
pub type SessionResult<T> = Result<T, SessionError>;
