use std::sync::Arc;

use async_trait::async_trait;
use backend_domain::ports::{HealthCheckService, ResourceRepository};

pub struct DefaultHealthService {
    resource_repo: Arc<dyn ResourceRepository>,
}

impl DefaultHealthService {
    pub fn new(resource_repo: Arc<dyn ResourceRepository>) -> Self {
        Self { resource_repo }
    }
}

#[async_trait]
impl HealthCheckService for DefaultHealthService {
    async fn check_database(&self) -> anyhow::Result<bool> {
        self.resource_repo.ping().await.map(|_| true)
    }
}
