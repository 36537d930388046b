use crate::{ApiClient, ApiRequest, ApiResult, RegisterRequest};
use serde_json::{json, Value};
use session_store::AuthPayload;

/// `/auth/*` endpoints.
pub struct AuthService<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthService<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthPayload> {
        self.client
            .post("/auth/login/", json!({ "email": email, "password": password }))
            .await
    }

    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<Value> {
        self.client
            .post("/auth/register/", serde_json::to_value(request)?)
            .await
    }

    pub async fn logout(&self) -> ApiResult<()> {
        self.client.send(ApiRequest::post("/auth/logout/")).await?;
        Ok(())
    }

    pub async fn change_password(&self, old_password: &str, new_password: &str) -> ApiResult<Value> {
        self.client
            .post(
                "/auth/change-password/",
                json!({ "old_password": old_password, "new_password": new_password }),
            )
            .await
    }
}
