use std::sync::Arc;

use backend_domain::ports::{
    CharacterDirectory, EventRepository, HealthCheckService, ReportSink, TeamRepository,
};
use backend_domain::{ReferenceData, RuntimeConfig};

use crate::{CharacterNameResolver, Metrics};

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub reference: Arc<ReferenceData>,
    pub event_repo: Arc<dyn EventRepository>,
    pub team_repo: Arc<dyn TeamRepository>,
    pub directory: Arc<dyn CharacterDirectory>,
    pub report_sink: Arc<dyn ReportSink>,
    pub health: Arc<dyn HealthCheckService>,
    pub resolver: Arc<CharacterNameResolver>,
    pub metrics: Arc<Metrics>,
}
