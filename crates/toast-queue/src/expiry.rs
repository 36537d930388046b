use crate::ToastQueue;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

/// How long a rendered toast stays visible.
pub const TOAST_LIFETIME: Duration = Duration::from_secs(5);

/// Expires toasts while mounted.
///
/// Every list change restarts the timer for all visible toasts. Dropping the
/// handle unmounts it and cancels any pending timer.
pub struct ToastExpiry {
    handle: JoinHandle<()>,
}

impl ToastExpiry {
    pub fn mount(queue: ToastQueue) -> Self {
        Self::with_lifetime(queue, TOAST_LIFETIME)
    }

    pub fn with_lifetime(queue: ToastQueue, lifetime: Duration) -> Self {
        let handle = tokio::spawn(run(queue, lifetime));
        Self { handle }
    }
}

async fn run(queue: ToastQueue, lifetime: Duration) {
    let mut rx = queue.subscribe();
    loop {
        let visible: Vec<Uuid> = rx.borrow_and_update().iter().map(|t| t.id).collect();

        if visible.is_empty() {
            if rx.changed().await.is_err() {
                break;
            }
            continue;
        }

        tokio::select! {
            _ = tokio::time::sleep(lifetime) => {
                let removed = queue.remove_all(&visible);
                debug!(removed, "Toasts expired");
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
}

impl Drop for ToastExpiry {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
