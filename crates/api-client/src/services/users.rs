use crate::{ApiClient, ApiResult, ListResponse};
use session_store::{User, UserPatch};

/// `/users/*` endpoints.
pub struct UsersService<'a> {
    client: &'a ApiClient,
}

impl<'a> UsersService<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn me(&self) -> ApiResult<User> {
        self.client.get("/users/me/").await
    }

    pub async fn update_me(&self, patch: &UserPatch) -> ApiResult<User> {
        self.client.put("/users/me/", serde_json::to_value(patch)?).await
    }

    pub async fn get(&self, id: &str) -> ApiResult<User> {
        self.client.get(&format!("/users/{id}/")).await
    }

    pub async fn agents(&self) -> ApiResult<Vec<User>> {
        let list: ListResponse<User> = self.client.get("/users/agents/").await?;
        Ok(list.into_vec())
    }
}
