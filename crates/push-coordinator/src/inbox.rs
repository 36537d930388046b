//! In-app notification list kept fresh by foreground pushes.

use crate::{MessageCallback, PushMessage};
use api_client::{ApiClient, Notification};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Latest notification list and unread counter.
#[derive(Debug, Clone, Default)]
pub struct InboxSnapshot {
    pub notifications: Vec<Notification>,
    pub unread_count: u64,
}

pub struct NotificationInbox {
    client: Arc<ApiClient>,
    state: watch::Sender<InboxSnapshot>,
}

impl NotificationInbox {
    pub fn new(client: Arc<ApiClient>) -> Self {
        let (state, _) = watch::channel(InboxSnapshot::default());
        Self { client, state }
    }

    pub fn snapshot(&self) -> InboxSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<InboxSnapshot> {
        self.state.subscribe()
    }

    /// Reload list and unread count. A failed list fetch leaves the inbox empty.
    pub async fn refresh(&self) -> InboxSnapshot {
        let notifications = match self.client.notifications().list(false).await {
            Ok(list) => list,
            Err(err) => {
                warn!(error = %err, "Failed to load notifications");
                Vec::new()
            }
        };
        let unread_count = match self.client.notifications().unread_count().await {
            Ok(count) => count,
            Err(err) => {
                warn!(error = %err, "Failed to load unread count");
                notifications.iter().filter(|n| !n.is_read).count() as u64
            }
        };
        debug!(total = notifications.len(), unread_count, "Inbox refreshed");

        let snapshot = InboxSnapshot {
            notifications,
            unread_count,
        };
        self.state.send_replace(snapshot.clone());
        snapshot
    }

    /// Callback for [`crate::PushCoordinator::on_message`] that reloads the
    /// inbox whenever a push arrives.
    pub fn callback(self: &Arc<Self>) -> MessageCallback {
        let inbox = Arc::clone(self);
        Arc::new(move |_message: &PushMessage| {
            let inbox = Arc::clone(&inbox);
            tokio::spawn(async move {
                inbox.refresh().await;
            });
        })
    }
}
