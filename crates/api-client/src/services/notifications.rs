use crate::{ApiClient, ApiRequest, ApiResult, ListResponse, Notification, PushRegistration};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
struct UnreadCount {
    #[serde(alias = "count")]
    unread_count: u64,
}

/// `/notifications/*` endpoints.
pub struct NotificationsService<'a> {
    client: &'a ApiClient,
}

impl<'a> NotificationsService<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, unread_only: bool) -> ApiResult<Vec<Notification>> {
        let request =
            ApiRequest::get("/notifications/").query("is_read", unread_only.then_some("false"));
        let list: ListResponse<Notification> = self.client.request(request).await?;
        Ok(list.into_vec())
    }

    pub async fn unread_count(&self) -> ApiResult<u64> {
        let count: UnreadCount = self.client.get("/notifications/unread-count/").await?;
        Ok(count.unread_count)
    }

    pub async fn mark_read(&self, id: &str) -> ApiResult<Value> {
        self.client
            .request(ApiRequest::put(format!("/notifications/{id}/read/")))
            .await
    }

    pub async fn mark_all_read(&self) -> ApiResult<Value> {
        self.client
            .request(ApiRequest::put("/notifications/mark-all-read/"))
            .await
    }

    pub async fn register_push_token(&self, registration: &PushRegistration) -> ApiResult<Value> {
        self.client
            .post("/notifications/fcm/register/", serde_json::to_value(registration)?)
            .await
    }

    pub async fn unregister_push_token(&self, token: &str) -> ApiResult<()> {
        self.client
            .send(ApiRequest::delete("/notifications/fcm/unregister/").json(json!({ "token": token })))
            .await?;
        Ok(())
    }
}
