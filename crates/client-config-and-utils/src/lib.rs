//! Configuration, filesystem paths, and logging setup for the CCSMS client.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, DEFAULT_API_URL, DEFAULT_LOG_LEVEL, DEFAULT_PUSH_PUBLIC_KEY,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::{session_scope_id, Paths};
