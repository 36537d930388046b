//! Errors raised while setting up the client.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid client configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// `api_url` did not parse.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Malformed config file: {0}")]
    Json(#[from] serde_json::Error),

    /// No home directory to put `~/.ccsms` in.
    #[error("Cannot resolve client directory: {0}")]
    Path(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
