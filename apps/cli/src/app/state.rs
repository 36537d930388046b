//! Client application context.

use super::TerminalNavigator;
use anyhow::{Context, Result};
use api_client::{ApiClient, AuthFlow, ReqwestTransport};
use client_config_and_utils::{session_scope_id, Config, Paths};
use client_storage::open_file_storage;
use push_coordinator::{NotificationInbox, PushCoordinator, PushMessage, UnsupportedPlatform};
use session_store::{
    HydrationGate, LoginRateLimiter, RouteDecision, RouteGuard, SessionStore, ThemePreference,
};
use std::sync::Arc;
use toast_queue::{Toast, ToastQueue};
use tracing::{debug, info};

/// Device name reported with push registrations.
const DEVICE_NAME: &str = concat!("ccsms-cli/", env!("CARGO_PKG_VERSION"));

/// Everything a command needs, built once per process.
pub struct AppContext {
    pub paths: Paths,
    pub config: Config,
    pub store: Arc<SessionStore>,
    pub gate: HydrationGate,
    pub client: Arc<ApiClient>,
    pub auth: AuthFlow,
    pub push: Arc<PushCoordinator>,
    pub inbox: Arc<NotificationInbox>,
    pub theme: ThemePreference,
    pub toasts: ToastQueue,
}

impl AppContext {
    pub fn new() -> Result<Self> {
        let paths = Paths::new()?;
        Self::with_paths(paths)
    }

    pub fn with_paths(paths: Paths) -> Result<Self> {
        paths.ensure_dirs()?;
        let config = Config::load(&paths)?;

        let durable = open_file_storage(&paths.local_storage_file())
            .context("failed to open local storage")?;
        let scope = session_scope_id();
        let tab = open_file_storage(&paths.session_scope_file(&scope))
            .context("failed to open session storage")?;
        debug!(scope = %scope, "Session scope selected");

        let toasts = ToastQueue::new();
        let store = Arc::new(SessionStore::new(tab.clone()));
        let gate = HydrationGate::new(Arc::clone(&store));

        let api_url = config.api_url()?;
        let transport = ReqwestTransport::new(api_url.as_str(), config.request_timeout())?;
        let client = Arc::new(
            ApiClient::new(
                Arc::new(transport),
                tab,
                Arc::new(TerminalNavigator::new(toasts.clone())),
            )
            .with_observer(Arc::clone(&store) as _),
        );

        let auth = AuthFlow::new(
            Arc::clone(&client),
            Arc::clone(&store),
            LoginRateLimiter::new(durable.clone()),
        );

        let push = Arc::new(PushCoordinator::new(
            Arc::new(UnsupportedPlatform),
            Arc::clone(&client) as _,
            durable.clone(),
            config.push_public_key().map(str::to_string),
            DEVICE_NAME,
        ));
        let inbox = Arc::new(NotificationInbox::new(Arc::clone(&client)));
        push.on_message(inbox.callback());
        let push_toasts = toasts.clone();
        push.on_message(Arc::new(move |message: &PushMessage| {
            if let Some(notification) = &message.notification {
                push_toasts.add(Toast::info(
                    notification.title.clone().unwrap_or_default(),
                    notification.body.clone().unwrap_or_default(),
                ));
            }
        }));

        let theme = ThemePreference::new(durable.clone());

        info!(api_url = %api_url, "Client context ready");
        Ok(Self {
            paths,
            config,
            store,
            gate,
            client,
            auth,
            push,
            inbox,
            theme,
            toasts,
        })
    }

    /// Hydrate the session and check `route` against it. Authenticated
    /// routes also start push setup.
    pub async fn mount(&self, route: &str) -> RouteDecision {
        self.gate.mount().await;
        let session = self.store.snapshot();
        let decision = RouteGuard.decide(&session, route);
        debug!(route, decision = ?decision, "Route checked");

        if decision == RouteDecision::Allow && session.is_authenticated {
            self.push.initialize(&session, route).await;
        }
        decision
    }

    /// Mount an authenticated route, failing when there is no session.
    pub async fn require_session(&self, route: &str) -> Result<()> {
        match self.mount(route).await {
            RouteDecision::Allow | RouteDecision::RedirectTo(_) => Ok(()),
            RouteDecision::RedirectToLogin | RouteDecision::Pending => {
                anyhow::bail!("Not logged in. Run 'ccsms login' first")
            }
        }
    }
}
