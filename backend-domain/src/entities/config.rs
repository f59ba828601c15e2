// Runtime configuration handed from infrastructure to the inner layers

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub report_dir: String,
    pub census_service_id: String,
    pub census_api_base: String,
    pub census_stream_url: String,
    pub stream_enabled: bool,
    pub stream_worlds: Vec<String>,
    pub stream_event_names: Vec<String>,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub prefetch_url_budget: usize,
    pub prefetch_batch_size: usize,
    /// Longest report window accepted, in minutes.
    pub max_report_minutes: i64,
    /// Outfits with more members than this are refused.
    pub max_outfit_members: usize,
    pub ingest: IngestFilter,
    pub reconstruction: ReconstructionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub clickhouse_url: String,
    pub clickhouse_database: String,
    pub clickhouse_user: Option<String>,
    pub clickhouse_password: Option<String>,
}

/// Events dropped before enrichment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestFilter {
    /// Zone definition ids of practice/VR/tutorial zones.
    pub non_scoring_zone_ids: Vec<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconstructionConfig {
    pub interval_seconds: i64,
    /// Silent intervals after which an active vehicle is presumed gone.
    pub vehicle_decay_intervals: i64,
    /// Max seconds between a death and a vehicle loss counted as one kill.
    pub kill_correlation_tolerance_seconds: i64,
    pub squad_experience_ids: Vec<String>,
}

pub const DEFAULT_BUCKET_INTERVAL_SECONDS: i64 = 60;
pub const DEFAULT_VEHICLE_DECAY_INTERVALS: i64 = 2;
pub const DEFAULT_KILL_CORRELATION_TOLERANCE_SECONDS: i64 = 8;
pub const DEFAULT_MAX_REPORT_MINUTES: i64 = 24 * 60;
pub const DEFAULT_MAX_OUTFIT_MEMBERS: usize = 1000;
pub const DEFAULT_SQUAD_EXPERIENCE_IDS: [&str; 6] = ["51", "53", "55", "56", "142", "439"];

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            interval_seconds: DEFAULT_BUCKET_INTERVAL_SECONDS,
            vehicle_decay_intervals: DEFAULT_VEHICLE_DECAY_INTERVALS,
            kill_correlation_tolerance_seconds: DEFAULT_KILL_CORRELATION_TOLERANCE_SECONDS,
            squad_experience_ids: DEFAULT_SQUAD_EXPERIENCE_IDS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl ReconstructionConfig {
    pub fn vehicle_decay_seconds(&self) -> i64 {
        self.vehicle_decay_intervals * self.interval_seconds
    }

    pub fn is_squad_experience(&self, experience_id: &str) -> bool {
        self.squad_experience_ids.iter().any(|id| id == experience_id)
    }
}
