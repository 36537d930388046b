//! Backend device registry.

use crate::PushResult;
use api_client::{ApiClient, PushRegistration};
use async_trait::async_trait;

/// Mirrors push tokens to the backend.
#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    async fn register(&self, registration: &PushRegistration) -> PushResult<()>;
    async fn unregister(&self, token: &str) -> PushResult<()>;
}

#[async_trait]
impl DeviceRegistry for ApiClient {
    async fn register(&self, registration: &PushRegistration) -> PushResult<()> {
        self.notifications().register_push_token(registration).await?;
        Ok(())
    }

    async fn unregister(&self, token: &str) -> PushResult<()> {
        self.notifications().unregister_push_token(token).await?;
        Ok(())
    }
}
