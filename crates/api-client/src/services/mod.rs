//! Typed wrappers over the backend REST endpoints.

mod analytics;
mod audit;
mod auth;
mod complaints;
mod notifications;
mod users;

pub use analytics::AnalyticsService;
pub use audit::AuditService;
pub use auth::AuthService;
pub use complaints::ComplaintsService;
pub use notifications::NotificationsService;
pub use users::UsersService;

use crate::ApiClient;

impl ApiClient {
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self)
    }

    pub fn users(&self) -> UsersService<'_> {
        UsersService::new(self)
    }

    pub fn complaints(&self) -> ComplaintsService<'_> {
        ComplaintsService::new(self)
    }

    pub fn notifications(&self) -> NotificationsService<'_> {
        NotificationsService::new(self)
    }

    pub fn analytics(&self) -> AnalyticsService<'_> {
        AnalyticsService::new(self)
    }

    pub fn audit(&self) -> AuditService<'_> {
        AuditService::new(self)
    }
}
