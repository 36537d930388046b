//! Backend resource models.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use session_store::{deserialize_id, User};
use std::fmt;

/// A list endpoint body: paginated `{results: [...]}` or a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Paginated {
        results: Vec<T>,
        #[serde(default)]
        count: Option<u64>,
    },
    Bare(Vec<T>),
}

impl<T> ListResponse<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListResponse::Paginated { results, .. } => results,
            ListResponse::Bare(items) => items,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplaintStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
    Escalated,
    Reopened,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComplaintPriority {
    Low,
    Medium,
    High,
    Critical,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComplaintStatus::Open => "OPEN",
            ComplaintStatus::InProgress => "IN_PROGRESS",
            ComplaintStatus::Resolved => "RESOLVED",
            ComplaintStatus::Closed => "CLOSED",
            ComplaintStatus::Escalated => "ESCALATED",
            ComplaintStatus::Reopened => "REOPENED",
            ComplaintStatus::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

impl fmt::Display for ComplaintPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComplaintPriority::Low => "LOW",
            ComplaintPriority::Medium => "MEDIUM",
            ComplaintPriority::High => "HIGH",
            ComplaintPriority::Critical => "CRITICAL",
            ComplaintPriority::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub user: Option<User>,
    pub content: String,
    #[serde(default)]
    pub is_internal: bool,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complaint {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub complaint_number: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub priority: ComplaintPriority,
    pub status: ComplaintStatus,
    /// Nested user on detail views, an id or name on list views.
    #[serde(default)]
    pub customer: Option<Value>,
    #[serde(default)]
    pub assigned_to: Option<Value>,
    #[serde(default)]
    pub sla_deadline: Option<String>,
    #[serde(default)]
    pub sla_breached: bool,
    #[serde(default)]
    pub resolution_notes: Option<String>,
    #[serde(default)]
    pub can_reopen: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Complaint {
    /// Display label for the assignee, if any.
    pub fn assignee_label(&self) -> Option<String> {
        match self.assigned_to.as_ref()? {
            Value::Object(obj) => obj
                .get("email")
                .or_else(|| obj.get("id"))
                .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string())),
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Filters for the complaint list.
#[derive(Debug, Clone, Default)]
pub struct ComplaintFilter {
    pub status: Option<ComplaintStatus>,
    pub priority: Option<ComplaintPriority>,
    pub search: Option<String>,
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewComplaint {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: ComplaintPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackRequest {
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_professionalism_rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_speed_rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub notification_type: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub sent_at: String,
    #[serde(default)]
    pub read_at: Option<String>,
    #[serde(default)]
    pub complaint: Option<Value>,
}

/// Role-dependent dashboard counters; absent fields do not apply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_complaints: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_progress: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_cases: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_today: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sla_breaches: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_resolution_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_satisfaction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sla_compliance_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub user: Option<User>,
    pub action: String,
    #[serde(default)]
    pub entity_type: String,
    #[serde(default)]
    pub entity_id: Option<Value>,
    #[serde(default)]
    pub changes: Option<Value>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub timestamp: String,
}

/// Device registration sent to `/notifications/fcm/register/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushRegistration {
    pub token: String,
    pub device_type: String,
    pub device_name: String,
}

impl PushRegistration {
    pub const DEVICE_TYPE_WEB: &'static str = "WEB";
    /// Longest device name the backend stores.
    pub const MAX_DEVICE_NAME: usize = 100;

    pub fn web(token: impl Into<String>, user_agent: &str) -> Self {
        Self {
            token: token.into(),
            device_type: Self::DEVICE_TYPE_WEB.to_string(),
            device_name: user_agent.chars().take(Self::MAX_DEVICE_NAME).collect(),
        }
    }
}

/// Analytics reports available under `/analytics/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    ComplaintsByCategory,
    ComplaintsByStatus,
    ComplaintsByPriority,
    SlaReport,
    FeedbackAnalysis,
    AgentPerformance,
    Trends,
    ComplaintsVolume,
}

impl ReportKind {
    pub fn path(&self) -> &'static str {
        match self {
            ReportKind::ComplaintsByCategory => "/analytics/complaints-by-category/",
            ReportKind::ComplaintsByStatus => "/analytics/complaints-by-status/",
            ReportKind::ComplaintsByPriority => "/analytics/complaints-by-priority/",
            ReportKind::SlaReport => "/analytics/sla-report/",
            ReportKind::FeedbackAnalysis => "/analytics/feedback-analysis/",
            ReportKind::AgentPerformance => "/analytics/agent-performance/",
            ReportKind::Trends => "/analytics/trend-detection/",
            ReportKind::ComplaintsVolume => "/analytics/complaints-volume/",
        }
    }
}
