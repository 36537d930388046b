//! REST client for the CCSMS backend.
//!
//! Every backend call goes through [`ApiClient`], which attaches the bearer
//! token from the persisted session and, on a 401, performs a single
//! refresh-and-retry. Concurrent 401s share one refresh: whoever takes the
//! refresh lock second sees the already-rotated token and reuses it.
//!
//! HTTP itself sits behind the [`HttpTransport`] trait so the interceptor can
//! be exercised without a network.

mod auth_flow;
mod client;
mod error;
mod message;
mod models;
mod observer;
mod services;
mod transport;

pub use auth_flow::AuthFlow;
pub use client::{ApiClient, Navigator};
pub use error::{ApiError, ApiResult};
pub use models::{
    AuditLog, Comment, Complaint, ComplaintFilter, ComplaintPriority, ComplaintStatus,
    DashboardStats, FeedbackRequest, ListResponse, NewComplaint, Notification, PushRegistration,
    RegisterRequest, ReportKind,
};
pub use observer::SessionObserver;
pub use services::{
    AnalyticsService, AuditService, AuthService, ComplaintsService, NotificationsService,
    UsersService,
};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, ReqwestTransport, TransportError};
