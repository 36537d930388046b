//! Push platform capability seam.

use crate::{PushError, PushResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::broadcast;

pub const DEFAULT_NOTIFICATION_TITLE: &str = "New Notification";
pub const DEFAULT_NOTIFICATION_ICON: &str = "/favicon.ico";

/// Notification permission as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Never asked.
    Default,
    Granted,
    Denied,
    Unsupported,
}

/// Visible part of a push message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushNotificationPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// A message delivered while the client is in the foreground.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushMessage {
    #[serde(default)]
    pub notification: Option<PushNotificationPayload>,
    #[serde(default)]
    pub data: HashMap<String, String>,
}

impl PushMessage {
    /// Route to open when the notification is clicked.
    pub fn deep_link(&self) -> String {
        match self.data.get("complaint_id").map(|id| id.trim()) {
            Some(id) if !id.is_empty() => format!("/complaints/{id}"),
            _ => "/".to_string(),
        }
    }
}

/// A pop-up to show through the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformNotification {
    pub title: String,
    pub body: String,
    pub icon: String,
    /// Focus the client and open this route on click.
    pub deep_link: String,
}

impl PlatformNotification {
    /// Pop-up for a message, if it carries a visible notification.
    pub fn from_message(message: &PushMessage) -> Option<Self> {
        let payload = message.notification.as_ref()?;
        Some(Self {
            title: payload
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_NOTIFICATION_TITLE.to_string()),
            body: payload.body.clone().unwrap_or_default(),
            icon: DEFAULT_NOTIFICATION_ICON.to_string(),
            deep_link: message.deep_link(),
        })
    }
}

/// What the coordinator needs from the notification platform and its
/// messaging service.
#[async_trait]
pub trait PushPlatform: Send + Sync {
    /// Current permission, without prompting.
    async fn permission(&self) -> PushResult<Permission>;

    /// Prompt the user. Only called when permission is [`Permission::Default`].
    async fn request_permission(&self) -> PushResult<Permission>;

    /// Register the background message handler if it is not registered yet.
    async fn ensure_service_worker(&self) -> PushResult<()>;

    /// Drop and re-register the background handler after a push service error.
    async fn reset_service_worker(&self) -> PushResult<()>;

    /// Obtain a registration token.
    async fn get_token(&self, public_key: &str) -> PushResult<Option<String>>;

    /// Revoke the token held by the messaging client.
    async fn delete_token(&self) -> PushResult<()>;

    /// Subscribe to foreground messages. `None` when the platform cannot deliver them.
    fn foreground_messages(&self) -> Option<broadcast::Receiver<PushMessage>>;

    async fn show_notification(&self, notification: PlatformNotification) -> PushResult<()>;
}

/// Platform for headless clients that have no notification surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedPlatform;

#[async_trait]
impl PushPlatform for UnsupportedPlatform {
    async fn permission(&self) -> PushResult<Permission> {
        Ok(Permission::Unsupported)
    }

    async fn request_permission(&self) -> PushResult<Permission> {
        Ok(Permission::Unsupported)
    }

    async fn ensure_service_worker(&self) -> PushResult<()> {
        Err(PushError::Unsupported)
    }

    async fn reset_service_worker(&self) -> PushResult<()> {
        Err(PushError::Unsupported)
    }

    async fn get_token(&self, _public_key: &str) -> PushResult<Option<String>> {
        Ok(None)
    }

    async fn delete_token(&self) -> PushResult<()> {
        Ok(())
    }

    fn foreground_messages(&self) -> Option<broadcast::Receiver<PushMessage>> {
        None
    }

    async fn show_notification(&self, _notification: PlatformNotification) -> PushResult<()> {
        Err(PushError::Unsupported)
    }
}
