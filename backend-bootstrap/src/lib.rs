pub mod context;
pub mod lifecycle;
pub mod telemetry;

pub use lifecycle::run_standalone;

pub async fn run() -> anyhow::Result<()> {
    let config = backend_infrastructure::AppConfig::load().await?;
    let _guard = telemetry::init_tracing(config.log_dir.as_deref())?;
    run_standalone(config).await
}
