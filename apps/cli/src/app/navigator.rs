//! Forced navigation for a terminal client.

use api_client::Navigator;
use session_store::LOGIN_ROUTE;
use toast_queue::{Toast, ToastQueue};
use tracing::info;

/// A terminal cannot change pages, so a forced redirect becomes a toast
/// telling the user what to run next.
pub struct TerminalNavigator {
    toasts: ToastQueue,
}

impl TerminalNavigator {
    pub fn new(toasts: ToastQueue) -> Self {
        Self { toasts }
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, path: &str) {
        info!(path, "Forced navigation");
        if path == LOGIN_ROUTE {
            self.toasts.add(Toast::warning(
                "Session expired",
                "Run `ccsms login` to sign in again",
            ));
        } else {
            self.toasts.add(Toast::info("Redirected", path));
        }
    }
}
