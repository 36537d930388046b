//! File system paths for the client.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Directory under the base dir holding per-scope session files.
const SESSIONS_DIR_NAME: &str = "sessions";

/// Manages file system paths for the client.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for client files (~/.ccsms)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.ccsms`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(".ccsms"),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.ccsms).
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.ccsms/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Durable key-value storage (~/.ccsms/local-storage.json).
    ///
    /// Outlives sessions: theme, push token, login rate limit.
    pub fn local_storage_file(&self) -> PathBuf {
        self.base_dir.join("local-storage.json")
    }

    /// Get the sessions directory (~/.ccsms/sessions).
    pub fn sessions_dir(&self) -> PathBuf {
        self.base_dir.join(SESSIONS_DIR_NAME)
    }

    /// Tab-scoped storage file (~/.ccsms/sessions/<scope>.json).
    pub fn session_scope_file(&self, scope: &str) -> PathBuf {
        let sanitized: String = scope
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let name = if sanitized.is_empty() {
            "default".to_string()
        } else {
            sanitized
        };
        self.sessions_dir().join(format!("{name}.json"))
    }

    /// Get the logs directory (~/.ccsms/logs).
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// Get the log file path (~/.ccsms/logs/client.jsonl).
    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join("client.jsonl")
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(self.sessions_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}

/// Identity of the current session scope.
///
/// A terminal stands in for a browser tab: every command launched from the same
/// shell shares the parent process id and therefore the same session. Set
/// `CCSMS_SESSION_SCOPE` to pin a scope explicitly.
pub fn session_scope_id() -> String {
    if let Ok(scope) = std::env::var("CCSMS_SESSION_SCOPE") {
        let scope = scope.trim();
        if !scope.is_empty() {
            return scope.to_string();
        }
    }

    #[cfg(unix)]
    {
        format!("ppid-{}", std::os::unix::process::parent_id())
    }

    #[cfg(not(unix))]
    {
        "default".to_string()
    }
}
