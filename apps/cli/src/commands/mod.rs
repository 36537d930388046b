//! CLI command implementations.

mod auth;
mod complaints;
mod notifications;
mod theme;

pub use auth::{login, logout, profile, status};
pub use complaints::{
    complaints_assign, complaints_close, complaints_comment, complaints_create,
    complaints_feedback, complaints_list, complaints_reopen, complaints_resolve, complaints_show,
    parse_priority,
};
pub use notifications::{notifications_list, notifications_read, notifications_read_all};
pub use theme::{theme_set, theme_show};

use anyhow::Result;
use serde::de::DeserializeOwned;

/// Parse an uppercase backend enum such as `IN_PROGRESS` from user input.
fn parse_backend_enum<T: DeserializeOwned + PartialEq>(input: &str, unknown: T, what: &str) -> Result<T> {
    let normalized = input.trim().to_ascii_uppercase().replace(['-', ' '], "_");
    let value: T = serde_json::from_value(serde_json::Value::String(normalized))?;
    if value == unknown {
        anyhow::bail!("unknown {} '{}'", what, input);
    }
    Ok(value)
}
