//! Push notification coordinator.

use crate::fsm::{PushMachine, PushMachineInput, PushState};
use crate::platform::{Permission, PlatformNotification, PushMessage, PushPlatform};
use crate::{DeviceRegistry, PushError};
use api_client::PushRegistration;
use client_storage::{ClientStorage, StorageKeys};
use parking_lot::{Mutex, RwLock};
use session_store::{is_public_route, Session};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Invoked for every foreground message.
pub type MessageCallback = Arc<dyn Fn(&PushMessage) + Send + Sync>;

/// Clears the in-flight flag when initialization ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Drives the push lifecycle for one authenticated session.
pub struct PushCoordinator {
    platform: Arc<dyn PushPlatform>,
    registry: Arc<dyn DeviceRegistry>,
    /// Durable storage holding the cached token.
    storage: ClientStorage,
    public_key: Option<String>,
    device_name: String,
    fsm: Mutex<PushMachine>,
    in_flight: AtomicBool,
    /// Bumped by every teardown; a run started under an older value is stale.
    generation: AtomicU64,
    callbacks: Arc<RwLock<Vec<MessageCallback>>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl PushCoordinator {
    pub fn new(
        platform: Arc<dyn PushPlatform>,
        registry: Arc<dyn DeviceRegistry>,
        storage: ClientStorage,
        public_key: Option<String>,
        device_name: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            registry,
            storage,
            public_key,
            device_name: device_name.into(),
            fsm: Mutex::new(PushMachine::new()),
            in_flight: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            callbacks: Arc::new(RwLock::new(Vec::new())),
            listener: Mutex::new(None),
        }
    }

    pub fn on_message(&self, callback: MessageCallback) {
        self.callbacks.write().push(callback);
    }

    pub fn state(&self) -> PushState {
        PushState::from(self.fsm.lock().state())
    }

    /// Token cached by the last successful initialization.
    pub fn cached_token(&self) -> Option<String> {
        self.storage.get_raw(StorageKeys::PUSH_TOKEN)
    }

    /// Apply an input. Impossible transitions are logged and ignored.
    fn transition(&self, input: PushMachineInput) -> PushState {
        let mut fsm = self.fsm.lock();
        let old_state = PushState::from(fsm.state());

        if fsm.consume(&input).is_err() {
            warn!(state = ?old_state, input = ?input, "Ignoring impossible push transition");
            return old_state;
        }

        let new_state = PushState::from(fsm.state());
        drop(fsm);

        if old_state != new_state {
            debug!(old_state = ?old_state, new_state = ?new_state, "Push state transition");
        }
        new_state
    }

    /// Set up push for an authenticated session on `route`.
    ///
    /// Runs at most once per session: later calls, and calls made while a
    /// run is in flight, return the current state. Never fails.
    pub async fn initialize(&self, session: &Session, route: &str) -> PushState {
        if !session.is_authenticated || session.user.is_none() {
            return self.state();
        }
        if is_public_route(route) {
            debug!(route, "Skipping push setup on public route");
            return self.state();
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return self.state();
        }
        let _in_flight = InFlight(&self.in_flight);

        if self.state() != PushState::Uninitialized {
            return self.state();
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let state = self.run(generation).await;
        info!(state = ?state, "Push setup finished");
        state
    }

    fn superseded(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }

    async fn run(&self, generation: u64) -> PushState {
        match self.resolve_permission().await {
            Permission::Unsupported => return self.transition(PushMachineInput::PlatformUnsupported),
            Permission::Denied | Permission::Default => {
                return self.transition(PushMachineInput::PermissionDenied)
            }
            Permission::Granted => {
                self.transition(PushMachineInput::PermissionGranted);
            }
        }

        if let Err(err) = self.platform.ensure_service_worker().await {
            warn!(error = %err, "Service worker registration failed");
        }

        let Some(public_key) = self.public_key.as_deref().filter(|k| !k.is_empty()) else {
            warn!("No push public key configured, notifications stay in-app only");
            return self.transition(PushMachineInput::TokenUnavailable);
        };

        let Some(token) = self.acquire_token(public_key).await else {
            return self.transition(PushMachineInput::TokenUnavailable);
        };
        if self.superseded(generation) {
            info!("Session ended during push setup, discarding token");
            if let Err(err) = self.platform.delete_token().await {
                warn!(error = %err, "Could not delete push token from messaging client");
            }
            return self.state();
        }

        self.storage.set_raw(StorageKeys::PUSH_TOKEN, &token);
        self.transition(PushMachineInput::TokenIssued);

        let registration = PushRegistration::web(token.clone(), &self.device_name);
        match self.registry.register(&registration).await {
            Ok(()) => {
                self.transition(PushMachineInput::BackendRegistered);
            }
            Err(err) => warn!(error = %err, "Push token registration failed"),
        }
        if self.superseded(generation) {
            info!("Session ended during push registration, unregistering token");
            self.forget_token(&token).await;
            return self.state();
        }

        self.start_listening()
    }

    /// Current permission, prompting once if it has never been asked.
    async fn resolve_permission(&self) -> Permission {
        let current = match self.platform.permission().await {
            Ok(permission) => permission,
            Err(err) => {
                warn!(error = %err, "Could not read notification permission");
                Permission::Unsupported
            }
        };
        if current == Permission::Unsupported {
            return current;
        }

        self.transition(PushMachineInput::CheckPermission);
        if current != Permission::Default {
            return current;
        }

        match self.platform.request_permission().await {
            Ok(permission) => {
                debug!(permission = ?permission, "Notification permission answered");
                permission
            }
            Err(err) => {
                warn!(error = %err, "Notification permission request failed");
                Permission::Denied
            }
        }
    }

    /// Fetch a token, re-registering the service worker and retrying once on
    /// a push service error.
    async fn acquire_token(&self, public_key: &str) -> Option<String> {
        match self.platform.get_token(public_key).await {
            Ok(token) => return token.filter(|t| !t.is_empty()),
            Err(PushError::PushService(reason)) => {
                warn!(reason = %reason, "Push service error, re-registering service worker");
            }
            Err(err) => {
                warn!(error = %err, "Could not obtain push token");
                return None;
            }
        }

        if let Err(err) = self.platform.reset_service_worker().await {
            warn!(error = %err, "Service worker re-registration failed");
            return None;
        }
        match self.platform.get_token(public_key).await {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(err) => {
                warn!(error = %err, "Could not obtain push token after retry");
                None
            }
        }
    }

    fn start_listening(&self) -> PushState {
        let Some(mut rx) = self.platform.foreground_messages() else {
            debug!("Platform does not deliver foreground messages");
            return self.state();
        };

        let platform = Arc::clone(&self.platform);
        let callbacks = Arc::clone(&self.callbacks);
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(message) => dispatch_message(platform.as_ref(), &callbacks, &message).await,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Foreground message listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("Foreground message listener stopped");
        });

        if let Some(previous) = self.listener.lock().replace(handle) {
            previous.abort();
        }
        self.transition(PushMachineInput::StartListening)
    }

    /// Unregister everywhere and forget the token. Called on logout.
    pub async fn teardown(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.listener.lock().take() {
            handle.abort();
        }

        if let Some(token) = self.cached_token() {
            self.forget_token(&token).await;
        }

        self.transition(PushMachineInput::TearDown);
    }

    async fn forget_token(&self, token: &str) {
        if let Err(err) = self.registry.unregister(token).await {
            warn!(error = %err, "Push token unregistration failed");
        }
        if let Err(err) = self.platform.delete_token().await {
            warn!(error = %err, "Could not delete push token from messaging client");
        }
        self.storage.remove(StorageKeys::PUSH_TOKEN);
        info!("Push token removed");
    }
}

async fn dispatch_message(
    platform: &dyn PushPlatform,
    callbacks: &RwLock<Vec<MessageCallback>>,
    message: &PushMessage,
) {
    debug!(has_notification = message.notification.is_some(), "Foreground message received");

    let snapshot: Vec<MessageCallback> = callbacks.read().clone();
    for callback in snapshot {
        callback(message);
    }

    let Some(popup) = PlatformNotification::from_message(message) else {
        return;
    };
    if !matches!(platform.permission().await, Ok(Permission::Granted)) {
        return;
    }
    if let Err(err) = platform.show_notification(popup).await {
        warn!(error = %err, "Could not show platform notification");
    }
}

impl Drop for PushCoordinator {
    fn drop(&mut self) {
        if let Some(handle) = self.listener.get_mut().take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for PushCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushCoordinator")
            .field("state", &self.state())
            .field("has_public_key", &self.public_key.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PushNotificationPayload;
    use crate::PushResult;
    use async_trait::async_trait;
    use client_storage::memory_storage;
    use parking_lot::Mutex as SyncMutex;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::{broadcast, mpsc, oneshot};

    struct FakePlatform {
        permission: SyncMutex<Permission>,
        answer: Permission,
        tokens: SyncMutex<VecDeque<PushResult<Option<String>>>>,
        messages: broadcast::Sender<PushMessage>,
        shown: mpsc::UnboundedSender<PlatformNotification>,
        permission_prompts: AtomicUsize,
        token_calls: AtomicUsize,
        worker_resets: AtomicUsize,
        token_deletes: AtomicUsize,
        token_gate: SyncMutex<Option<oneshot::Receiver<()>>>,
    }

    impl FakePlatform {
        fn new(
            permission: Permission,
            answer: Permission,
            tokens: Vec<PushResult<Option<String>>>,
        ) -> (Arc<Self>, mpsc::UnboundedReceiver<PlatformNotification>) {
            let (messages, _) = broadcast::channel(8);
            let (shown, shown_rx) = mpsc::unbounded_channel();
            let platform = Arc::new(Self {
                permission: SyncMutex::new(permission),
                answer,
                tokens: SyncMutex::new(tokens.into()),
                messages,
                shown,
                permission_prompts: AtomicUsize::new(0),
                token_calls: AtomicUsize::new(0),
                worker_resets: AtomicUsize::new(0),
                token_deletes: AtomicUsize::new(0),
                token_gate: SyncMutex::new(None),
            });
            (platform, shown_rx)
        }
    }

    #[async_trait]
    impl PushPlatform for FakePlatform {
        async fn permission(&self) -> PushResult<Permission> {
            Ok(*self.permission.lock())
        }

        async fn request_permission(&self) -> PushResult<Permission> {
            self.permission_prompts.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            *self.permission.lock() = self.answer;
            Ok(self.answer)
        }

        async fn ensure_service_worker(&self) -> PushResult<()> {
            Ok(())
        }

        async fn reset_service_worker(&self) -> PushResult<()> {
            self.worker_resets.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn get_token(&self, _public_key: &str) -> PushResult<Option<String>> {
            self.token_calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.token_gate.lock().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            self.tokens.lock().pop_front().unwrap_or(Ok(None))
        }

        async fn delete_token(&self) -> PushResult<()> {
            self.token_deletes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn foreground_messages(&self) -> Option<broadcast::Receiver<PushMessage>> {
            Some(self.messages.subscribe())
        }

        async fn show_notification(&self, notification: PlatformNotification) -> PushResult<()> {
            let _ = self.shown.send(notification);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeRegistry {
        fail: bool,
        registered: SyncMutex<Vec<PushRegistration>>,
        unregistered: SyncMutex<Vec<String>>,
    }

    #[async_trait]
    impl DeviceRegistry for FakeRegistry {
        async fn register(&self, registration: &PushRegistration) -> PushResult<()> {
            if self.fail {
                return Err(PushError::Platform("backend unavailable".into()));
            }
            self.registered.lock().push(registration.clone());
            Ok(())
        }

        async fn unregister(&self, token: &str) -> PushResult<()> {
            self.unregistered.lock().push(token.to_string());
            Ok(())
        }
    }

    fn signed_in() -> Session {
        let user = serde_json::from_value(serde_json::json!({
            "id": 7,
            "email": "agent@example.com",
            "role": "AGENT"
        }))
        .unwrap();
        Session {
            user: Some(user),
            access_token: Some("access".into()),
            refresh_token: Some("refresh".into()),
            is_authenticated: true,
            hydrated: true,
        }
    }

    fn coordinator(
        platform: Arc<FakePlatform>,
        registry: Arc<FakeRegistry>,
        storage: ClientStorage,
    ) -> PushCoordinator {
        PushCoordinator::new(
            platform,
            registry,
            storage,
            Some("BPublicKey".into()),
            "test-agent",
        )
    }

    #[tokio::test]
    async fn test_denied_permission_stops_without_token() {
        let (platform, _shown) = FakePlatform::new(Permission::Denied, Permission::Denied, vec![]);
        let registry = Arc::new(FakeRegistry::default());
        let push = coordinator(platform.clone(), registry.clone(), memory_storage());

        let state = push.initialize(&signed_in(), "/dashboard").await;

        assert_eq!(state, PushState::Denied);
        assert_eq!(platform.token_calls.load(Ordering::SeqCst), 0);
        assert!(registry.registered.lock().is_empty());
        assert!(push.cached_token().is_none());
    }

    #[tokio::test]
    async fn test_prompt_then_register_and_listen() {
        let (platform, mut shown) = FakePlatform::new(
            Permission::Default,
            Permission::Granted,
            vec![Ok(Some("tok-1".into()))],
        );
        let registry = Arc::new(FakeRegistry::default());
        let storage = memory_storage();
        let push = coordinator(platform.clone(), registry.clone(), storage.clone());

        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
        push.on_message(Arc::new(move |message: &PushMessage| {
            let _ = seen_tx.send(message.clone());
        }));

        let state = push.initialize(&signed_in(), "/complaints").await;

        assert_eq!(state, PushState::Listening);
        assert_eq!(platform.permission_prompts.load(Ordering::SeqCst), 1);
        assert_eq!(storage.get_raw(StorageKeys::PUSH_TOKEN).as_deref(), Some("tok-1"));
        let registered = registry.registered.lock().clone();
        assert_eq!(registered.len(), 1);
        assert_eq!(registered[0].token, "tok-1");
        assert_eq!(registered[0].device_type, "WEB");

        let mut data = HashMap::new();
        data.insert("complaint_id".to_string(), "c-9".to_string());
        platform
            .messages
            .send(PushMessage {
                notification: Some(PushNotificationPayload {
                    title: Some("Complaint updated".into()),
                    body: Some("Now in progress".into()),
                }),
                data,
            })
            .unwrap();

        let seen = tokio::time::timeout(Duration::from_secs(1), seen_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(seen.deep_link(), "/complaints/c-9");

        let popup = tokio::time::timeout(Duration::from_secs(1), shown.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(popup.title, "Complaint updated");
        assert_eq!(popup.deep_link, "/complaints/c-9");
    }

    #[tokio::test]
    async fn test_skips_public_route_and_signed_out_session() {
        let (platform, _shown) =
            FakePlatform::new(Permission::Granted, Permission::Granted, vec![]);
        let push = coordinator(platform.clone(), Arc::new(FakeRegistry::default()), memory_storage());

        assert_eq!(push.initialize(&signed_in(), "/login").await, PushState::Uninitialized);
        assert_eq!(push.initialize(&Session::default(), "/dashboard").await, PushState::Uninitialized);
        assert_eq!(platform.token_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_runs_once_per_session() {
        let (platform, _shown) = FakePlatform::new(
            Permission::Granted,
            Permission::Granted,
            vec![Ok(Some("tok-1".into())), Ok(Some("tok-2".into()))],
        );
        let registry = Arc::new(FakeRegistry::default());
        let push = coordinator(platform.clone(), registry.clone(), memory_storage());
        let session = signed_in();

        let (first, second) = tokio::join!(
            push.initialize(&session, "/dashboard"),
            push.initialize(&session, "/dashboard"),
        );
        assert!(first == PushState::Listening || second == PushState::Listening);

        assert_eq!(push.initialize(&session, "/dashboard").await, PushState::Listening);
        assert_eq!(platform.token_calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.registered.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_push_service_error_retries_once() {
        let (platform, _shown) = FakePlatform::new(
            Permission::Granted,
            Permission::Granted,
            vec![
                Err(PushError::PushService("registration-token-not-registered".into())),
                Ok(Some("tok-retry".into())),
            ],
        );
        let push = coordinator(platform.clone(), Arc::new(FakeRegistry::default()), memory_storage());

        assert_eq!(push.initialize(&signed_in(), "/dashboard").await, PushState::Listening);
        assert_eq!(platform.worker_resets.load(Ordering::SeqCst), 1);
        assert_eq!(platform.token_calls.load(Ordering::SeqCst), 2);
        assert_eq!(push.cached_token().as_deref(), Some("tok-retry"));
    }

    #[tokio::test]
    async fn test_missing_token_degrades() {
        let (platform, _shown) =
            FakePlatform::new(Permission::Granted, Permission::Granted, vec![Ok(None)]);
        let push = coordinator(platform, Arc::new(FakeRegistry::default()), memory_storage());

        assert_eq!(push.initialize(&signed_in(), "/dashboard").await, PushState::Degraded);
        assert!(push.cached_token().is_none());
    }

    #[tokio::test]
    async fn test_missing_public_key_degrades_without_token_call() {
        let (platform, _shown) =
            FakePlatform::new(Permission::Granted, Permission::Granted, vec![]);
        let push = PushCoordinator::new(
            platform.clone(),
            Arc::new(FakeRegistry::default()),
            memory_storage(),
            None,
            "test-agent",
        );

        assert_eq!(push.initialize(&signed_in(), "/dashboard").await, PushState::Degraded);
        assert_eq!(platform.token_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_registry_failure_still_listens() {
        let (platform, _shown) = FakePlatform::new(
            Permission::Granted,
            Permission::Granted,
            vec![Ok(Some("tok-1".into()))],
        );
        let registry = Arc::new(FakeRegistry {
            fail: true,
            ..Default::default()
        });
        let push = coordinator(platform, registry, memory_storage());

        assert_eq!(push.initialize(&signed_in(), "/dashboard").await, PushState::Listening);
        assert_eq!(push.cached_token().as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn test_teardown_unregisters_and_forgets_token() {
        let (platform, _shown) = FakePlatform::new(
            Permission::Granted,
            Permission::Granted,
            vec![Ok(Some("tok-1".into())), Ok(Some("tok-2".into()))],
        );
        let registry = Arc::new(FakeRegistry::default());
        let push = coordinator(platform.clone(), registry.clone(), memory_storage());

        push.initialize(&signed_in(), "/dashboard").await;
        push.teardown().await;

        assert_eq!(push.state(), PushState::Uninitialized);
        assert_eq!(registry.unregistered.lock().as_slice(), ["tok-1".to_string()]);
        assert_eq!(platform.token_deletes.load(Ordering::SeqCst), 1);
        assert!(push.cached_token().is_none());

        // A new session starts over.
        assert_eq!(push.initialize(&signed_in(), "/dashboard").await, PushState::Listening);
        assert_eq!(push.cached_token().as_deref(), Some("tok-2"));
    }

    #[tokio::test]
    async fn test_teardown_without_token_skips_unregister() {
        let (platform, _shown) = FakePlatform::new(Permission::Denied, Permission::Denied, vec![]);
        let registry = Arc::new(FakeRegistry::default());
        let push = coordinator(platform.clone(), registry.clone(), memory_storage());

        push.initialize(&signed_in(), "/dashboard").await;
        push.teardown().await;

        assert!(registry.unregistered.lock().is_empty());
        assert_eq!(platform.token_deletes.load(Ordering::SeqCst), 0);
        assert_eq!(push.state(), PushState::Uninitialized);
    }

    #[tokio::test]
    async fn test_teardown_during_token_request_discards_token() {
        let (platform, _shown) = FakePlatform::new(
            Permission::Granted,
            Permission::Granted,
            vec![Ok(Some("tok-late".into()))],
        );
        let (release, gate) = oneshot::channel();
        *platform.token_gate.lock() = Some(gate);
        let registry = Arc::new(FakeRegistry::default());
        let push = coordinator(platform.clone(), registry.clone(), memory_storage());
        let session = signed_in();

        let logout = async {
            while platform.token_calls.load(Ordering::SeqCst) == 0 {
                tokio::task::yield_now().await;
            }
            push.teardown().await;
            release.send(()).unwrap();
        };
        let (state, ()) = tokio::join!(push.initialize(&session, "/dashboard"), logout);

        assert_eq!(state, PushState::Uninitialized);
        assert!(push.cached_token().is_none());
        assert!(registry.registered.lock().is_empty());
        assert_eq!(platform.token_deletes.load(Ordering::SeqCst), 1);
    }
}
