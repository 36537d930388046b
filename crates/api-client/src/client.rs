//! Request interceptor: bearer injection and 401 refresh-and-retry.

use crate::message::extract_message;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport};
use crate::{ApiError, ApiResult, SessionObserver};
use client_storage::{ClientStorage, SessionEnvelope, StorageKeys};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use session_store::LOGIN_ROUTE;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const REFRESH_PATH: &str = "/auth/refresh/";

/// Sends the user somewhere else. In a browser this is a page navigation.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

/// Login and registration never carry a bearer and never trigger a refresh.
fn is_auth_exempt(path: &str) -> bool {
    path.contains("/auth/login") || path.contains("/auth/register")
}

/// The single path through which every backend call flows.
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    storage: ClientStorage,
    navigator: Arc<dyn Navigator>,
    observer: Option<Arc<dyn SessionObserver>>,
    refresh_lock: Mutex<()>,
    redirecting: AtomicBool,
}

impl ApiClient {
    /// `storage` is the tab-scoped storage holding the session envelope.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        storage: ClientStorage,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport,
            storage,
            navigator,
            observer: None,
            refresh_lock: Mutex::new(()),
            redirecting: AtomicBool::new(false),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Allow the next forced logout to navigate again.
    pub fn reset_login_redirect(&self) {
        self.redirecting.store(false, Ordering::SeqCst);
    }

    /// Send a request and return the successful response.
    pub async fn send(&self, mut request: ApiRequest) -> ApiResult<ApiResponse> {
        let exempt = is_auth_exempt(&request.path);
        request.bearer = if exempt { None } else { self.stored_access_token() };

        let response = self.dispatch(&request).await?;
        if response.status != 401 {
            return into_success(response);
        }
        if exempt {
            return Err(server_error(&response));
        }
        if request.retried {
            return Err(self.login_required());
        }

        let failed_token = request.bearer.take();
        let token = self.refresh_access_token(failed_token.as_deref()).await?;

        request.bearer = Some(token);
        request.retried = true;
        debug!(method = %request.method, path = %request.path, "Retrying request after refresh");

        let retry = self.dispatch(&request).await?;
        if retry.status == 401 {
            return Err(self.login_required());
        }
        into_success(retry)
    }

    pub async fn request<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let response = self.send(request).await?;
        decode(&response)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(ApiRequest::get(path)).await
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: Value) -> ApiResult<T> {
        self.request(ApiRequest::post(path).json(body)).await
    }

    pub async fn put<T: DeserializeOwned>(&self, path: &str, body: Value) -> ApiResult<T> {
        self.request(ApiRequest::put(path).json(body)).await
    }

    pub async fn patch<T: DeserializeOwned>(&self, path: &str, body: Value) -> ApiResult<T> {
        self.request(ApiRequest::patch(path).json(body)).await
    }

    /// Fetch a binary body, such as a CSV export.
    pub async fn get_bytes(&self, request: ApiRequest) -> ApiResult<Vec<u8>> {
        Ok(self.send(request).await?.body)
    }

    async fn dispatch(&self, request: &ApiRequest) -> ApiResult<ApiResponse> {
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(method = %request.method, path = %request.path, error = %err, "Request failed without a response");
                return Err(ApiError::Network);
            }
        };

        debug!(
            method = %request.method,
            path = %request.path,
            status = response.status,
            retried = request.retried,
            "Response received"
        );

        if !response.is_success() && response.is_html() {
            warn!(path = %request.path, status = response.status, "Server returned an HTML error page");
            return Err(ApiError::HtmlErrorPage {
                status: response.status,
            });
        }
        Ok(response)
    }

    fn read_envelope(&self) -> Option<SessionEnvelope<Value>> {
        self.storage.get_json(StorageKeys::AUTH_SESSION)
    }

    /// Access token straight from storage, not from the in-memory store.
    fn stored_access_token(&self) -> Option<String> {
        let envelope = self.read_envelope()?;
        string_field(envelope.state(), "accessToken")
    }

    /// Obtain a fresh access token, refreshing at most once across
    /// concurrent callers.
    async fn refresh_access_token(&self, failed_token: Option<&str>) -> ApiResult<String> {
        let _guard = self.refresh_lock.lock().await;

        let Some(envelope) = self.read_envelope() else {
            info!("No stored session to refresh");
            return Err(self.expire_session());
        };

        let state = envelope.state();
        let Some(refresh_token) = string_field(state, "refreshToken") else {
            info!("Stored session has no refresh token");
            return Err(self.expire_session());
        };

        if let Some(current) = string_field(state, "accessToken") {
            if failed_token != Some(current.as_str()) {
                debug!("Access token already refreshed by a concurrent request");
                return Ok(current);
            }
        }

        let refreshed = match self.call_refresh(&refresh_token).await {
            Ok(refreshed) => refreshed,
            Err(err) => {
                warn!(error = %err, "Token refresh failed");
                return Err(self.expire_session());
            }
        };

        let rotated = refreshed.refresh.clone();
        let updated = envelope.map_state(|mut state| {
            if let Value::Object(map) = &mut state {
                map.insert("accessToken".into(), json!(refreshed.access));
                if let Some(refresh) = &rotated {
                    map.insert("refreshToken".into(), json!(refresh));
                }
            }
            state
        });
        self.storage.set_json(StorageKeys::AUTH_SESSION, &updated);

        if let Some(observer) = &self.observer {
            observer.tokens_refreshed(&refreshed.access, rotated.as_deref());
        }
        info!(rotated = rotated.is_some(), "Access token refreshed");
        Ok(refreshed.access)
    }

    async fn call_refresh(&self, refresh_token: &str) -> ApiResult<RefreshResponse> {
        let request = ApiRequest::post(REFRESH_PATH).json(json!({ "refresh": refresh_token }));
        let response = self.dispatch(&request).await?;
        let response = into_success(response)?;
        decode(&response)
    }

    /// Drop the persisted session and send the user to login.
    fn expire_session(&self) -> ApiError {
        self.storage.remove(StorageKeys::AUTH_SESSION);
        if let Some(observer) = &self.observer {
            observer.session_cleared();
        }
        self.login_required()
    }

    fn login_required(&self) -> ApiError {
        if !self.redirecting.swap(true, Ordering::SeqCst) {
            info!(route = LOGIN_ROUTE, "Redirecting to login");
            self.navigator.navigate(LOGIN_ROUTE);
        }
        ApiError::LoginRequired
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("redirecting", &self.redirecting.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

fn string_field(state: &Value, key: &str) -> Option<String> {
    state
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn server_error(response: &ApiResponse) -> ApiError {
    ApiError::Server {
        status: response.status,
        message: extract_message(&response.body, response.status),
    }
}

fn into_success(response: ApiResponse) -> ApiResult<ApiResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(server_error(&response))
    }
}

/// Decode a JSON body. An empty body decodes as `null`.
pub(crate) fn decode<T: DeserializeOwned>(response: &ApiResponse) -> ApiResult<T> {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_value(Value::Null)?);
    }
    Ok(serde_json::from_slice(&response.body)?)
}
