use std::sync::Arc;

use anyhow::Result;
use clickhouse::Client;
use tracing::{info, warn};

use backend_application::commands::team_commands;
use backend_application::{AppState, CharacterNameResolver, Metrics};
use backend_domain::ports::{EventRepository, ReferenceSource, TeamRepository};
use backend_domain::DbConfig;
use backend_infrastructure::{
    ensure_dir, AppConfig, CensusClient, ClickhouseRepo, DefaultHealthService, FileReportSink,
    MemoryRepo, ReferenceFiles, StorageBackend,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let runtime_config = config.to_runtime_config();
        let (event_repo, team_repo) = build_repositories(config.storage, &config.to_db_config()).await?;

        let reference = ReferenceFiles::new(&config.reference_dir)
            .load_reference_data()
            .await?;
        ensure_dir(&runtime_config.report_dir).await?;

        let census = Arc::new(CensusClient::new(&runtime_config)?);
        let metrics = Arc::new(Metrics::default());
        let resolver = Arc::new(CharacterNameResolver::new(census.clone(), metrics.clone()));

        let state = AppState {
            reference: Arc::new(reference),
            event_repo: event_repo.clone(),
            team_repo,
            directory: census.clone(),
            report_sink: Arc::new(FileReportSink::new(&runtime_config.report_dir)),
            health: Arc::new(DefaultHealthService::new(event_repo, census)),
            resolver,
            metrics,
            config: runtime_config,
        };

        let seeded = team_commands::seed_resolver(&state).await?;
        info!(seeded, "name cache seeded from tracked characters and outfits");

        Ok(Self { state })
    }
}

async fn build_repositories(
    storage: StorageBackend,
    db_config: &DbConfig,
) -> Result<(Arc<dyn EventRepository>, Arc<dyn TeamRepository>)> {
    match storage {
        StorageBackend::Clickhouse => {
            let mut clickhouse = Client::default()
                .with_url(&db_config.clickhouse_url)
                .with_database(&db_config.clickhouse_database);
            if let Some(user) = &db_config.clickhouse_user {
                clickhouse = clickhouse.with_user(user);
            }
            if let Some(password) = &db_config.clickhouse_password {
                clickhouse = clickhouse.with_password(password);
            }
            let repo = Arc::new(ClickhouseRepo::new(
                clickhouse,
                db_config.clickhouse_database.clone(),
            ));
            repo.ensure_schema().await?;
            Ok((repo.clone(), repo))
        }
        StorageBackend::Memory => {
            warn!("using in-memory storage, events are lost on restart");
            let repo = Arc::new(MemoryRepo::new());
            Ok((repo.clone(), repo))
        }
    }
}
