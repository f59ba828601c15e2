use std::sync::Arc;

use async_trait::async_trait;
use backend_domain::ports::{EventRepository, HealthCheckService};

use super::CensusClient;

pub struct DefaultHealthService {
    event_repo: Arc<dyn EventRepository>,
    census: Arc<CensusClient>,
}

impl DefaultHealthService {
    pub fn new(event_repo: Arc<dyn EventRepository>, census: Arc<CensusClient>) -> Self {
        Self { event_repo, census }
    }
}

#[async_trait]
impl HealthCheckService for DefaultHealthService {
    async fn check_database(&self) -> anyhow::Result<bool> {
        self.event_repo.ping().await.map(|_| true)
    }

    async fn check_census(&self) -> anyhow::Result<bool> {
        self.census.ping().await.map(|_| true)
    }
}
