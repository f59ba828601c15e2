use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use backend_domain::{
    DbConfig, IngestFilter, ReconstructionConfig, RuntimeConfig, DEFAULT_BUCKET_INTERVAL_SECONDS,
    DEFAULT_KILL_CORRELATION_TOLERANCE_SECONDS, DEFAULT_MAX_OUTFIT_MEMBERS,
    DEFAULT_MAX_REPORT_MINUTES, DEFAULT_SQUAD_EXPERIENCE_IDS, DEFAULT_VEHICLE_DECAY_INTERVALS,
};

use super::validation::{validate_numeric_ids, validate_service_id, validate_url};

/// Upper bound for `max_report_minutes`, one year.
const MAX_REPORT_MINUTES_CEILING: i64 = 366 * 24 * 60;

/// VR training, tutorial and practice zone definition ids.
pub const DEFAULT_NON_SCORING_ZONE_IDS: [u64; 6] = [95, 96, 97, 98, 361, 364];

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Clickhouse,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub storage: StorageBackend,
    pub clickhouse_url: String,
    pub clickhouse_database: String,
    pub clickhouse_user: Option<String>,
    pub clickhouse_password: Option<String>,
    pub census_service_id: String,
    pub census_api_base: String,
    pub census_stream_url: String,
    pub stream_enabled: bool,
    pub stream_worlds: Vec<String>,
    pub stream_event_names: Vec<String>,
    pub reference_dir: String,
    pub report_dir: String,
    pub log_dir: Option<String>,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub bucket_interval_seconds: i64,
    pub vehicle_decay_intervals: i64,
    pub kill_correlation_tolerance_seconds: i64,
    pub squad_experience_ids: Vec<String>,
    pub non_scoring_zone_ids: Vec<u64>,
    pub prefetch_url_budget: usize,
    pub prefetch_batch_size: usize,
    pub max_report_minutes: i64,
    pub max_outfit_members: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3234".to_string(),
            api_token: None,
            storage: StorageBackend::Clickhouse,
            clickhouse_url: "http://127.0.0.1:8123".to_string(),
            clickhouse_database: "warlog".to_string(),
            clickhouse_user: None,
            clickhouse_password: None,
            census_service_id: "example".to_string(),
            census_api_base: "https://census.daybreakgames.com".to_string(),
            census_stream_url: "wss://push.planetside2.com/streaming".to_string(),
            stream_enabled: true,
            stream_worlds: vec!["all".to_string()],
            stream_event_names: [
                "Death",
                "VehicleDestroy",
                "GainExperience",
                "PlayerFacilityCapture",
                "PlayerFacilityDefend",
                "SkillAdded",
                "ItemAdded",
                "PlayerLogin",
                "PlayerLogout",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            reference_dir: "./api-maps".to_string(),
            report_dir: "./reports".to_string(),
            log_dir: None,
            max_body_bytes: 8 * 1024 * 1024,
            request_timeout_seconds: 15,
            bucket_interval_seconds: DEFAULT_BUCKET_INTERVAL_SECONDS,
            vehicle_decay_intervals: DEFAULT_VEHICLE_DECAY_INTERVALS,
            kill_correlation_tolerance_seconds: DEFAULT_KILL_CORRELATION_TOLERANCE_SECONDS,
            squad_experience_ids: DEFAULT_SQUAD_EXPERIENCE_IDS
                .iter()
                .map(ToString::to_string)
                .collect(),
            non_scoring_zone_ids: DEFAULT_NON_SCORING_ZONE_IDS.to_vec(),
            prefetch_url_budget: 1800,
            prefetch_batch_size: 200,
            max_report_minutes: DEFAULT_MAX_REPORT_MINUTES,
            max_outfit_members: DEFAULT_MAX_OUTFIT_MEMBERS,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var("WARLOG_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        Self::load_from(Path::new(&path)).await
    }

    pub async fn load_from(file_path: &Path) -> Result<Self> {
        let base_dir = file_path.parent();
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            toml::from_str::<AppConfig>(&content)?
        } else {
            warn!(path = %file_path.display(), "config file not found, using defaults");
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        self.api_token = blank_to_none(self.api_token.take());
        self.clickhouse_user = blank_to_none(self.clickhouse_user.take());
        self.clickhouse_password = blank_to_none(self.clickhouse_password.take());
        self.log_dir = blank_to_none(self.log_dir.take());
        self.census_service_id = self
            .census_service_id
            .trim()
            .trim_start_matches("s:")
            .to_string();
        self.census_api_base = self.census_api_base.trim().trim_end_matches('/').to_string();
        self.stream_worlds = normalize_id_list(std::mem::take(&mut self.stream_worlds));
        self.stream_event_names = normalize_id_list(std::mem::take(&mut self.stream_event_names));
        self.squad_experience_ids =
            normalize_id_list(std::mem::take(&mut self.squad_experience_ids));
        self.non_scoring_zone_ids.sort_unstable();
        self.non_scoring_zone_ids.dedup();
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.reference_dir = resolve_path(base, &self.reference_dir);
        self.report_dir = resolve_path(base, &self.report_dir);
        if let Some(log_dir) = &self.log_dir {
            self.log_dir = Some(resolve_path(base, log_dir));
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if self.bucket_interval_seconds <= 0 {
            return Err(anyhow!("bucket_interval_seconds must be greater than 0"));
        }
        if self.vehicle_decay_intervals <= 0 {
            return Err(anyhow!("vehicle_decay_intervals must be greater than 0"));
        }
        if self.kill_correlation_tolerance_seconds < 0 {
            return Err(anyhow!("kill_correlation_tolerance_seconds must not be negative"));
        }
        if self.prefetch_url_budget < 256 || self.prefetch_batch_size == 0 {
            return Err(anyhow!("prefetch_url_budget or prefetch_batch_size out of range"));
        }
        if self.max_report_minutes <= 0 || self.max_report_minutes > MAX_REPORT_MINUTES_CEILING {
            return Err(anyhow!(
                "max_report_minutes must be between 1 and {}",
                MAX_REPORT_MINUTES_CEILING
            ));
        }
        if self.max_outfit_members == 0 {
            return Err(anyhow!("max_outfit_members must be greater than 0"));
        }
        validate_service_id(&self.census_service_id)?;
        validate_url(&self.census_api_base, "census_api_base", &["https", "http"])?;
        validate_url(&self.census_stream_url, "census_stream_url", &["wss", "ws"])?;
        validate_numeric_ids(&self.squad_experience_ids, "squad_experience_ids")?;
        if !(self.stream_worlds.len() == 1 && self.stream_worlds[0] == "all") {
            validate_numeric_ids(&self.stream_worlds, "stream_worlds")?;
        }
        if self.storage == StorageBackend::Clickhouse && self.clickhouse_database.trim().is_empty() {
            return Err(anyhow!("clickhouse_database must not be empty"));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            api_token: self.api_token.clone(),
            report_dir: self.report_dir.clone(),
            census_service_id: self.census_service_id.clone(),
            census_api_base: self.census_api_base.clone(),
            census_stream_url: self.census_stream_url.clone(),
            stream_enabled: self.stream_enabled,
            stream_worlds: self.stream_worlds.clone(),
            stream_event_names: self.stream_event_names.clone(),
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
            prefetch_url_budget: self.prefetch_url_budget,
            prefetch_batch_size: self.prefetch_batch_size,
            max_report_minutes: self.max_report_minutes,
            max_outfit_members: self.max_outfit_members,
            ingest: IngestFilter {
                non_scoring_zone_ids: self.non_scoring_zone_ids.clone(),
            },
            reconstruction: self.to_reconstruction_config(),
        }
    }

    pub fn to_reconstruction_config(&self) -> ReconstructionConfig {
        ReconstructionConfig {
            interval_seconds: self.bucket_interval_seconds,
            vehicle_decay_intervals: self.vehicle_decay_intervals,
            kill_correlation_tolerance_seconds: self.kill_correlation_tolerance_seconds,
            squad_experience_ids: self.squad_experience_ids.clone(),
        }
    }

    pub fn to_db_config(&self) -> DbConfig {
        DbConfig {
            clickhouse_url: self.clickhouse_url.clone(),
            clickhouse_database: self.clickhouse_database.clone(),
            clickhouse_user: self.clickhouse_user.clone(),
            clickhouse_password: self.clickhouse_password.clone(),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("WARLOG_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("WARLOG_API_TOKEN") {
            self.api_token = Some(value);
        }
        if let Ok(value) = env::var("WARLOG_STORAGE") {
            match value.trim().to_lowercase().as_str() {
                "memory" => self.storage = StorageBackend::Memory,
                "clickhouse" => self.storage = StorageBackend::Clickhouse,
                other => warn!("ignoring unknown WARLOG_STORAGE '{}'", other),
            }
        }
        if let Ok(value) = env::var("WARLOG_CLICKHOUSE_URL") {
            self.clickhouse_url = value;
        }
        if let Ok(value) = env::var("WARLOG_CLICKHOUSE_DATABASE") {
            self.clickhouse_database = value;
        }
        if let Ok(value) = env::var("WARLOG_CLICKHOUSE_USER") {
            self.clickhouse_user = Some(value);
        }
        if let Ok(value) = env::var("WARLOG_CLICKHOUSE_PASSWORD") {
            self.clickhouse_password = Some(value);
        }
        if let Ok(value) = env::var("WARLOG_CENSUS_SERVICE_ID") {
            self.census_service_id = value;
        }
        if let Ok(value) = env::var("WARLOG_CENSUS_API_BASE") {
            self.census_api_base = value;
        }
        if let Ok(value) = env::var("WARLOG_CENSUS_STREAM_URL") {
            self.census_stream_url = value;
        }
        if let Ok(value) = env::var("WARLOG_STREAM_ENABLED") {
            self.stream_enabled = value.parse().unwrap_or(self.stream_enabled);
        }
        if let Ok(value) = env::var("WARLOG_STREAM_WORLDS") {
            self.stream_worlds = parse_env_id_list(&value);
        }
        if let Ok(value) = env::var("WARLOG_STREAM_EVENT_NAMES") {
            self.stream_event_names = parse_env_id_list(&value);
        }
        if let Ok(value) = env::var("WARLOG_REFERENCE_DIR") {
            self.reference_dir = value;
        }
        if let Ok(value) = env::var("WARLOG_REPORT_DIR") {
            self.report_dir = value;
        }
        if let Ok(value) = env::var("WARLOG_LOG_DIR") {
            self.log_dir = Some(value);
        }
        if let Ok(value) = env::var("WARLOG_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("WARLOG_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Ok(value) = env::var("WARLOG_BUCKET_INTERVAL_SECONDS") {
            self.bucket_interval_seconds = value.parse().unwrap_or(self.bucket_interval_seconds);
        }
        if let Ok(value) = env::var("WARLOG_VEHICLE_DECAY_INTERVALS") {
            self.vehicle_decay_intervals = value.parse().unwrap_or(self.vehicle_decay_intervals);
        }
        if let Ok(value) = env::var("WARLOG_KILL_CORRELATION_TOLERANCE_SECONDS") {
            self.kill_correlation_tolerance_seconds = value
                .parse()
                .unwrap_or(self.kill_correlation_tolerance_seconds);
        }
        if let Ok(value) = env::var("WARLOG_SQUAD_EXPERIENCE_IDS") {
            self.squad_experience_ids = parse_env_id_list(&value);
        }
        if let Ok(value) = env::var("WARLOG_NON_SCORING_ZONE_IDS") {
            self.non_scoring_zone_ids = parse_env_id_list(&value)
                .iter()
                .filter_map(|id| id.parse().ok())
                .collect();
        }
        if let Ok(value) = env::var("WARLOG_PREFETCH_URL_BUDGET") {
            self.prefetch_url_budget = value.parse().unwrap_or(self.prefetch_url_budget);
        }
        if let Ok(value) = env::var("WARLOG_PREFETCH_BATCH_SIZE") {
            self.prefetch_batch_size = value.parse().unwrap_or(self.prefetch_batch_size);
        }
        if let Ok(value) = env::var("WARLOG_MAX_REPORT_MINUTES") {
            self.max_report_minutes = value.parse().unwrap_or(self.max_report_minutes);
        }
        if let Ok(value) = env::var("WARLOG_MAX_OUTFIT_MEMBERS") {
            self.max_outfit_members = value.parse().unwrap_or(self.max_outfit_members);
        }
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|item| !item.trim().is_empty())
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}

fn parse_env_id_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn normalize_id_list(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = values
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_and_carry_reconstruction_constants() {
        let mut config = AppConfig::default();
        config.normalize();
        config.validate().unwrap();
        let reconstruction = config.to_reconstruction_config();
        assert_eq!(reconstruction.interval_seconds, 60);
        assert_eq!(reconstruction.vehicle_decay_intervals, 2);
        assert_eq!(reconstruction.kill_correlation_tolerance_seconds, 8);
        assert_eq!(
            config.to_runtime_config().ingest.non_scoring_zone_ids,
            vec![95, 96, 97, 98, 361, 364]
        );
    }

    #[test]
    fn toml_overrides_merge_with_defaults() {
        let mut config: AppConfig = toml::from_str(
            r#"
storage = "memory"
api_token = "  "
census_service_id = "s:mytoken"
stream_worlds = ["17", " 1 ", "17"]
bucket_interval_seconds = 30
"#,
        )
        .unwrap();
        config.normalize();
        config.validate().unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.api_token, None);
        assert_eq!(config.census_service_id, "mytoken");
        assert_eq!(config.stream_worlds, vec!["1", "17"]);
        assert_eq!(config.to_reconstruction_config().interval_seconds, 30);
        assert_eq!(config.prefetch_url_budget, 1800);
    }

    #[test]
    fn relative_paths_follow_the_config_file() {
        let mut config = AppConfig {
            log_dir: Some("logs".into()),
            ..AppConfig::default()
        };
        config.resolve_paths(Some(Path::new("/etc/warlog")));
        assert_eq!(config.reference_dir, "/etc/warlog/./api-maps");
        assert_eq!(config.log_dir.as_deref(), Some("/etc/warlog/logs"));
    }

    #[test]
    fn report_window_limit_must_be_positive_and_bounded() {
        for minutes in [0, -5, MAX_REPORT_MINUTES_CEILING + 1] {
            let config = AppConfig {
                max_report_minutes: minutes,
                ..AppConfig::default()
            };
            assert!(config.validate().is_err(), "{} accepted", minutes);
        }
        let config = AppConfig {
            max_report_minutes: 90,
            ..AppConfig::default()
        };
        config.validate().unwrap();
        assert_eq!(config.to_runtime_config().max_report_minutes, 90);

        let zero_members = AppConfig {
            max_outfit_members: 0,
            ..AppConfig::default()
        };
        assert!(zero_members.validate().is_err());
    }

    #[test]
    fn rejects_zero_interval() {
        let config = AppConfig {
            bucket_interval_seconds: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
