use crate::{ApiClient, ApiRequest, ApiResult, AuditLog, ListResponse};

/// `/audit/*` endpoints.
pub struct AuditService<'a> {
    client: &'a ApiClient,
}

impl<'a> AuditService<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Newest first.
    pub async fn list(&self, date_range: Option<&str>) -> ApiResult<Vec<AuditLog>> {
        let request = ApiRequest::get("/audit/")
            .query("ordering", Some("-timestamp"))
            .query("date_range", date_range);
        let list: ListResponse<AuditLog> = self.client.request(request).await?;
        Ok(list.into_vec())
    }

    pub async fn for_complaint(&self, complaint_id: &str) -> ApiResult<Vec<AuditLog>> {
        let list: ListResponse<AuditLog> = self
            .client
            .get(&format!("/audit/complaint/{complaint_id}/"))
            .await?;
        Ok(list.into_vec())
    }
}
