use crate::{ApiClient, ApiRequest, ApiResult, DashboardStats, ReportKind};
use serde_json::Value;

/// Export window used when none is given, in days.
const DEFAULT_EXPORT_RANGE: &str = "30";

/// `/analytics/*` endpoints.
pub struct AnalyticsService<'a> {
    client: &'a ApiClient,
}

impl<'a> AnalyticsService<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn dashboard(&self) -> ApiResult<DashboardStats> {
        self.client.get("/analytics/dashboard/").await
    }

    pub async fn report(&self, kind: ReportKind, date_range: Option<&str>) -> ApiResult<Value> {
        self.client
            .request(ApiRequest::get(kind.path()).query("date_range", date_range))
            .await
    }

    /// CSV export. Error bodies for this endpoint are decoded like any other.
    pub async fn export_csv(&self, date_range: Option<&str>) -> ApiResult<Vec<u8>> {
        let range = date_range.unwrap_or(DEFAULT_EXPORT_RANGE);
        self.client
            .get_bytes(ApiRequest::get("/analytics/export/").query("date_range", Some(range)))
            .await
    }
}
