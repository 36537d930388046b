//! Theme preference persisted in durable storage.

use client_storage::{ClientStorage, StorageKeys};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{other}', expected light or dark")),
        }
    }
}

/// Reads and writes the `theme` key. Stored as the bare string.
#[derive(Debug, Clone)]
pub struct ThemePreference {
    storage: ClientStorage,
}

impl ThemePreference {
    pub fn new(storage: ClientStorage) -> Self {
        Self { storage }
    }

    /// Stored theme, light when unset or unrecognized.
    pub fn get(&self) -> Theme {
        self.storage
            .get_raw(StorageKeys::THEME)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    pub fn set(&self, theme: Theme) {
        self.storage.set_raw(StorageKeys::THEME, theme.as_str());
    }

    pub fn toggle(&self) -> Theme {
        let next = self.get().toggled();
        self.set(next);
        next
    }
}
