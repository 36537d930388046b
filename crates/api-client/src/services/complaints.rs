use crate::{
    ApiClient, ApiRequest, ApiResult, Comment, Complaint, ComplaintFilter, FeedbackRequest,
    ListResponse, NewComplaint,
};
use serde_json::{json, Value};

/// `/complaints/*` endpoints.
pub struct ComplaintsService<'a> {
    client: &'a ApiClient,
}

impl<'a> ComplaintsService<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, filter: &ComplaintFilter) -> ApiResult<Vec<Complaint>> {
        let request = ApiRequest::get("/complaints/")
            .query("status", filter.status)
            .query("priority", filter.priority)
            .query("search", filter.search.as_deref())
            .query("page", filter.page);
        let list: ListResponse<Complaint> = self.client.request(request).await?;
        Ok(list.into_vec())
    }

    pub async fn get(&self, id: &str) -> ApiResult<Complaint> {
        self.client.get(&format!("/complaints/{id}/")).await
    }

    pub async fn create(&self, complaint: &NewComplaint) -> ApiResult<Complaint> {
        self.client
            .post("/complaints/", serde_json::to_value(complaint)?)
            .await
    }

    /// Partial update. Agents may only change title and description.
    pub async fn update(&self, id: &str, changes: Value) -> ApiResult<Complaint> {
        self.client.patch(&format!("/complaints/{id}/"), changes).await
    }

    pub async fn assign(&self, id: &str, agent_id: &str) -> ApiResult<Value> {
        self.action(id, "assign", json!({ "assigned_to": agent_id })).await
    }

    pub async fn resolve(&self, id: &str, resolution_notes: &str) -> ApiResult<Value> {
        self.action(id, "resolve", json!({ "resolution_notes": resolution_notes }))
            .await
    }

    pub async fn close(&self, id: &str) -> ApiResult<Value> {
        self.action(id, "close", json!({})).await
    }

    pub async fn reopen(&self, id: &str, reason: Option<&str>) -> ApiResult<Value> {
        self.action(id, "reopen", json!({ "reason": reason })).await
    }

    pub async fn add_comment(&self, id: &str, content: &str, is_internal: bool) -> ApiResult<Comment> {
        self.client
            .post(
                &format!("/complaints/{id}/comments/"),
                json!({ "content": content, "is_internal": is_internal }),
            )
            .await
    }

    pub async fn add_feedback(&self, id: &str, feedback: &FeedbackRequest) -> ApiResult<Value> {
        self.action(id, "feedback", serde_json::to_value(feedback)?).await
    }

    pub async fn request_assignment(&self, id: &str, message: Option<&str>) -> ApiResult<Value> {
        self.action(id, "request-assignment", json!({ "message": message }))
            .await
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.client
            .send(ApiRequest::delete(format!("/complaints/{id}/")))
            .await?;
        Ok(())
    }

    async fn action(&self, id: &str, action: &str, body: Value) -> ApiResult<Value> {
        self.client
            .post(&format!("/complaints/{id}/{action}/"), body)
            .await
    }
}
