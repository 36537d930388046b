#![allow(dead_code)]

use api_client::{ApiClient, ApiRequest, ApiResponse, HttpTransport, Navigator, TransportError};
use async_trait::async_trait;
use client_storage::{ClientStorage, SessionEnvelope, StorageKeys};
use serde_json::{json, Value};
use session_store::{SessionStore, TokenPair, User};
use std::sync::{Arc, Mutex};

type Responder = Box<dyn Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync>;

/// Transport answering from a closure and recording every request.
pub struct FakeTransport {
    responder: Responder,
    log: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn new(
        responder: impl Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            log: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.log.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<ApiRequest> {
        self.requests().into_iter().filter(|r| r.path == path).collect()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.log.lock().unwrap().push(request.clone());
        // Give concurrent requests a chance to interleave.
        tokio::task::yield_now().await;
        (self.responder)(request)
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visits.lock().unwrap().push(path.to_string());
    }
}

pub struct Harness {
    pub transport: Arc<FakeTransport>,
    pub navigator: Arc<RecordingNavigator>,
    pub storage: ClientStorage,
    pub store: Arc<SessionStore>,
    pub client: Arc<ApiClient>,
}

pub fn harness(transport: Arc<FakeTransport>) -> Harness {
    let storage = client_storage::memory_storage();
    let store = Arc::new(SessionStore::new(storage.clone()));
    let navigator = Arc::new(RecordingNavigator::default());
    let client = Arc::new(
        ApiClient::new(transport.clone(), storage.clone(), navigator.clone())
            .with_observer(store.clone()),
    );
    Harness {
        transport,
        navigator,
        storage,
        store,
        client,
    }
}

pub fn user_json() -> Value {
    json!({
        "id": "u-1",
        "email": "agent@example.com",
        "first_name": "Grace",
        "last_name": "Hopper",
        "phone": "555-0101",
        "role": "AGENT",
        "is_active": true,
        "date_joined": "2024-02-01T00:00:00Z"
    })
}

pub fn user() -> User {
    serde_json::from_value(user_json()).unwrap()
}

impl Harness {
    /// Sign in locally with the given tokens.
    pub fn sign_in(&self, access: &str, refresh: &str) {
        self.store
            .set_auth(user(), TokenPair::new(access, refresh))
            .unwrap();
    }

    pub fn stored_envelope(&self) -> Option<SessionEnvelope<Value>> {
        self.storage.get_json(StorageKeys::AUTH_SESSION)
    }
}

pub fn ok(body: Value) -> Result<ApiResponse, TransportError> {
    Ok(ApiResponse::json(200, &body))
}

pub fn status(code: u16, body: Value) -> Result<ApiResponse, TransportError> {
    Ok(ApiResponse::json(code, &body))
}

pub fn unauthorized() -> Result<ApiResponse, TransportError> {
    status(401, json!({ "detail": "Given token not valid for any token type" }))
}

pub fn bearer(request: &ApiRequest) -> Option<&str> {
    request.bearer.as_deref()
}
